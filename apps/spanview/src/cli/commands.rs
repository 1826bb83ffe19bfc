//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, Envelope};
use crate::settings::Settings;
use serde::Serialize;
use spanview_core::{Diagnostics, ListingItem, SpanviewError};

/// Print a value as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> Result<(), SpanviewError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| SpanviewError::IoError(format!("Serialize output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Print recorded diagnostics to stderr.
fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.entries() {
        eprintln!("[{}] {}", diagnostic.kind.severity(), diagnostic.message);
    }
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), SpanviewError> {
    if let Some(host) = host {
        settings.host = host;
    }
    if let Some(port) = port {
        settings.port = port;
    }

    println!("Spanview Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:         {}", settings.host);
    println!("  Port:         {}", settings.port);
    println!("  Data:         {}", settings.data_dir.display());
    println!("  Locale:       {:?}", settings.locale);
    println!("  Verification: {}", settings.verification);
    println!();
    println!("Endpoints:");
    println!("  GET /collection?collection=           - Collection listing");
    println!("  GET /document?collection=&document=   - Document projection");
    println!("  GET /timestamp?collection=&document=  - Annotation mtime");
    println!("  GET /health                           - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", settings.host, settings.port);
    api::run_server(&addr, settings).await
}

// =============================================================================
// COLLECTION COMMAND
// =============================================================================

/// List a collection.
pub fn cmd_collection(
    settings: Settings,
    path: &str,
    json_mode: bool,
    verbose: bool,
) -> Result<(), SpanviewError> {
    let state = AppState::new(settings);
    let mut diagnostics = Diagnostics::new();
    let listing = state.list_collection(path, &mut diagnostics)?;

    if json_mode {
        return print_json(&Envelope::new(listing, diagnostics));
    }

    println!("Collection {}", path);
    println!("==========={}", "=".repeat(path.chars().count()));
    if let Some(description) = &listing.description {
        println!("{}", description.trim_end());
        println!();
    }
    for item in &listing.items {
        match item {
            ListingItem::Collection(name) => println!("  [c] {}/", name),
            ListingItem::Document { name, mtime } if *mtime >= 0.0 => {
                println!("  [d] {}  (modified {:.0})", name, mtime);
            }
            ListingItem::Document { name, .. } => println!("  [d] {}  (no annotations)", name),
        }
    }

    if verbose {
        let catalog = &listing.catalog;
        println!();
        println!("Entity types:      {}", catalog.entity_types.len());
        println!("Event types:       {}", catalog.event_types.len());
        println!("Relation types:    {}", catalog.relation_types.len());
        println!(
            "Attribute types:   {}",
            catalog.entity_attribute_types.len() + catalog.event_attribute_types.len()
        );
        println!("Unconfigured:      {}", catalog.unconfigured_types.len());
    }
    print_diagnostics(&diagnostics);

    Ok(())
}

// =============================================================================
// DOCUMENT COMMAND
// =============================================================================

/// Project one document.
pub fn cmd_document(
    settings: Settings,
    collection: &str,
    name: &str,
    json_mode: bool,
    verbose: bool,
) -> Result<(), SpanviewError> {
    let state = AppState::new(settings);
    let mut diagnostics = Diagnostics::new();
    let projection = state.project_document(collection, name, &mut diagnostics)?;

    if json_mode {
        return print_json(&Envelope::new(projection, diagnostics));
    }

    println!("Document {}", name);
    println!("========={}", "=".repeat(name.chars().count()));
    println!("Characters: {}", projection.text.chars().count());
    println!("Sentences:  {}", projection.sentence_offsets.len());
    println!("Tokens:     {}", projection.token_offsets.len());
    println!("Entities:   {}", projection.entities.len());
    println!("Triggers:   {}", projection.triggers.len());
    println!("Events:     {}", projection.events.len());
    println!("Relations:  {}", projection.relations.len());
    println!("Attributes: {}", projection.attributes.len());
    println!("Comments:   {}", projection.comments.len());
    println!("Sources:    {}", projection.source_files.join(", "));

    if verbose {
        println!();
        for row in &projection.entities {
            let text: String = projection
                .text
                .chars()
                .skip(row.2)
                .take(row.3.saturating_sub(row.2))
                .collect();
            println!("  {}\t{} {} {}\t{}", row.0, row.1, row.2, row.3, text);
        }
    }
    print_diagnostics(&diagnostics);

    Ok(())
}

// =============================================================================
// TYPES COMMAND
// =============================================================================

/// Print the type catalog of a collection as JSON.
pub fn cmd_types(settings: Settings, collection: &str) -> Result<(), SpanviewError> {
    let state = AppState::new(settings);
    let mut diagnostics = Diagnostics::new();
    let catalog = state.type_catalog(collection, &mut diagnostics)?;
    print_diagnostics(&diagnostics);
    print_json(&catalog)
}

// =============================================================================
// TIMESTAMP COMMAND
// =============================================================================

/// Print the annotation modification time of a document.
pub fn cmd_timestamp(
    settings: Settings,
    collection: &str,
    name: &str,
    json_mode: bool,
) -> Result<(), SpanviewError> {
    let state = AppState::new(settings);
    let mtime = state.document_timestamp(collection, name)?;

    if json_mode {
        return print_json(&api::TimestampResponse { mtime });
    }
    if mtime >= 0.0 {
        println!("{:.3}", mtime);
    } else {
        println!("no annotation file");
    }
    Ok(())
}
