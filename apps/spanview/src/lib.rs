//! # Spanview - THE BINARY (library part)
//!
//! The I/O surfaces around `spanview-core`: settings loading, the clap CLI
//! and the axum HTTP API. `main.rs` only initialises logging and dispatches
//! into [`cli::execute`].

pub mod api;
pub mod cli;
pub mod settings;

pub use settings::Settings;
