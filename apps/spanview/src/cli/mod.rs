//! # Spanview CLI Module
//!
//! This module implements the CLI interface for Spanview.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `collection` - List a collection with its type catalog
//! - `document` - Project one document
//! - `types` - Print the type catalog of a collection
//! - `timestamp` - Print the annotation modification time of a document

mod commands;

use crate::settings::Settings;
use clap::{Parser, Subcommand};
use spanview_core::SpanviewError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Spanview - annotation projection server
///
/// Serves type catalogs and document models for standoff annotation
/// projects stored on disk.
#[derive(Parser, Debug)]
#[command(name = "spanview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (default: ./spanview.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overrides the settings file
    #[arg(short = 'D', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (default from settings)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default from settings)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List a collection
    Collection {
        /// Collection path below the data directory
        #[arg(default_value = "/")]
        path: String,
    },

    /// Project a document
    Document {
        /// Collection path below the data directory
        collection: String,

        /// Document name without suffix
        name: String,
    },

    /// Show the type catalog of a collection
    Types {
        /// Collection path below the data directory
        #[arg(default_value = "/")]
        collection: String,
    },

    /// Show the annotation modification time of a document
    Timestamp {
        /// Collection path below the data directory
        collection: String,

        /// Document name without suffix
        name: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve settings from the global flags.
pub fn resolve_settings(cli: &Cli) -> Result<Settings, SpanviewError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    Ok(settings)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SpanviewError> {
    let settings = resolve_settings(&cli)?;
    let json_mode = cli.json_mode;
    let verbose = cli.verbose;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(settings, host, port).await,
        Some(Commands::Collection { path }) => {
            cmd_collection(settings, &path, json_mode, verbose)
        }
        Some(Commands::Document { collection, name }) => {
            cmd_document(settings, &collection, &name, json_mode, verbose)
        }
        Some(Commands::Types { collection }) => cmd_types(settings, &collection),
        Some(Commands::Timestamp { collection, name }) => {
            cmd_timestamp(settings, &collection, &name, json_mode)
        }
        None => {
            // No subcommand - list the root collection
            cmd_collection(settings, "/", json_mode, verbose)
        }
    }
}
