//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use spanview_core::{Diagnostics, SpanviewError};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// QUERIES
// =============================================================================

fn root_collection() -> String {
    "/".to_string()
}

/// `?collection=` for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionQuery {
    #[serde(default = "root_collection")]
    pub collection: String,
}

/// `?collection=&document=` for documents and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentQuery {
    #[serde(default = "root_collection")]
    pub collection: String,
    pub document: String,
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Client message: `[text, severity]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message(pub String, pub String);

/// Convert recorded diagnostics into client messages.
#[must_use]
pub fn messages_from(diagnostics: Diagnostics) -> Vec<Message> {
    diagnostics
        .into_vec()
        .into_iter()
        .map(|d| Message(d.message, d.kind.severity().to_string()))
        .collect()
}

/// A successful body with its messages appended.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    #[serde(flatten)]
    pub body: T,
    pub messages: Vec<Message>,
}

impl<T> Envelope<T> {
    pub fn new(body: T, diagnostics: Diagnostics) -> Self {
        Self {
            body,
            messages: messages_from(diagnostics),
        }
    }
}

// =============================================================================
// TIMESTAMP RESPONSE
// =============================================================================

/// Document timestamp response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampResponse {
    pub mtime: f64,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Failure body: `{exception, message, messages}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub exception: String,
    pub message: String,
    pub messages: Vec<Message>,
}

impl ErrorResponse {
    /// Build from a fatal error and whatever was reported before it.
    #[must_use]
    pub fn from_error(error: &SpanviewError, diagnostics: Diagnostics) -> Self {
        let mut messages = messages_from(diagnostics);
        messages.push(Message(error.to_string(), "error".to_string()));
        Self {
            exception: error.exception().to_string(),
            message: error.to_string(),
            messages,
        }
    }
}
