//! # Spanview - Annotation Projection Server
//!
//! The main binary for the Spanview projection engine.
//!
//! This application provides:
//! - HTTP JSON API server (axum-based)
//! - CLI interface for collection and document projections
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/spanview (THE BINARY)         │
//! │                                               │
//! │  ┌─────────────┐    ┌─────────────┐           │
//! │  │   CLI       │    │   HTTP API  │  settings │
//! │  │  (clap)     │    │   (axum)    │  (toml)   │
//! │  └──────┬──────┘    └──────┬──────┘           │
//! │         └────────┬─────────┘                  │
//! │                  ▼                            │
//! │          ┌────────────────┐                   │
//! │          │ spanview-core  │                   │
//! │          │  (THE LOGIC)   │                   │
//! │          └────────────────┘                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! spanview --data-dir ./data serve --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! spanview collection /bio
//! spanview --json-mode document /bio pmid-1234
//! spanview types /bio
//! ```

use clap::Parser;
use spanview::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SPANVIEW_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SPANVIEW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "spanview=info,spanview_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(exception = e.exception(), "Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Spanview startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┌─┐┌┐┌┬  ┬┬┌─┐┬ ┬
  └─┐├─┘├─┤│││└┐┌┘│├┤ │││
  └─┘┴  ┴ ┴┘└┘ └┘ ┴└─┘└┴┘

  Annotation Projection Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
