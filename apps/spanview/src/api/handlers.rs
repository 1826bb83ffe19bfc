//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        CollectionQuery, DocumentQuery, Envelope, ErrorResponse, HealthResponse,
        TimestampResponse,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use spanview_core::{Diagnostics, SpanviewError};

/// HTTP status for a fatal projection error.
#[must_use]
pub fn status_for(error: &SpanviewError) -> StatusCode {
    match error {
        SpanviewError::DirectoryNotDocument { .. } => StatusCode::BAD_REQUEST,
        SpanviewError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        SpanviewError::TextUnreadable { .. } | SpanviewError::CollectionNotAccessible { .. } => {
            StatusCode::NOT_FOUND
        }
        SpanviewError::InvalidConfiguration { .. }
        | SpanviewError::AnnotationsUnreadable { .. }
        | SpanviewError::VerificationFailed(_)
        | SpanviewError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render a projection outcome with its diagnostics.
fn respond<T: Serialize>(result: Result<T, SpanviewError>, diagnostics: Diagnostics) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(Envelope::new(body, diagnostics))).into_response(),
        Err(e) => {
            tracing::warn!(exception = e.exception(), "Request failed: {}", e);
            (
                status_for(&e),
                Json(ErrorResponse::from_error(&e, diagnostics)),
            )
                .into_response()
        }
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// COLLECTION HANDLER
// =============================================================================

/// List a collection with its type catalog.
pub async fn collection_handler(
    State(state): State<AppState>,
    Query(query): Query<CollectionQuery>,
) -> Response {
    let mut diagnostics = Diagnostics::new();
    let result = state.list_collection(&query.collection, &mut diagnostics);
    respond(result, diagnostics)
}

// =============================================================================
// DOCUMENT HANDLER
// =============================================================================

/// Project one document.
pub async fn document_handler(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Response {
    let mut diagnostics = Diagnostics::new();
    let result = state.project_document(&query.collection, &query.document, &mut diagnostics);
    respond(result, diagnostics)
}

// =============================================================================
// TIMESTAMP HANDLER
// =============================================================================

/// Modification time of a document's annotations.
pub async fn timestamp_handler(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Response {
    let result = state
        .document_timestamp(&query.collection, &query.document)
        .map(|mtime| TimestampResponse { mtime });
    respond(result, Diagnostics::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn error_kinds_map_to_statuses() {
        let path = PathBuf::from("/data/x");
        assert_eq!(
            status_for(&SpanviewError::DirectoryNotDocument { path: path.clone() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SpanviewError::AccessDenied { path: path.clone() }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&SpanviewError::TextUnreadable {
                path,
                reason: "gone".into()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&SpanviewError::VerificationFailed("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
