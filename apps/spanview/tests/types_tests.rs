//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use spanview::api::{
    CollectionQuery, DocumentQuery, Envelope, ErrorResponse, HealthResponse, Message,
    TimestampResponse, messages_from,
};
use spanview_core::{DiagnosticKind, Diagnostics, SpanviewError};
use std::path::PathBuf;

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// QUERY TESTS
// =============================================================================

#[test]
fn test_collection_query_defaults_to_root() {
    let query: CollectionQuery = serde_json::from_str("{}").unwrap();
    assert_eq!(query.collection, "/");
}

#[test]
fn test_document_query_requires_document() {
    let query: DocumentQuery = serde_json::from_str(r#"{"document":"doc1"}"#).unwrap();
    assert_eq!(query.collection, "/");
    assert_eq!(query.document, "doc1");

    assert!(serde_json::from_str::<DocumentQuery>(r#"{"collection":"/bio"}"#).is_err());
}

// =============================================================================
// MESSAGE TESTS
// =============================================================================

#[test]
fn test_message_serializes_as_pair() {
    let message = Message("Visual config error".into(), "warning".into());
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json, serde_json::json!(["Visual config error", "warning"]));
}

#[test]
fn test_messages_keep_report_order_and_severity() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.configuration_defect("short list");
    diagnostics.report(DiagnosticKind::AnnotationParse, "bad line");

    let messages = messages_from(diagnostics);
    assert_eq!(
        messages,
        vec![
            Message("short list".into(), "warning".into()),
            Message("bad line".into(), "error".into()),
        ]
    );
}

#[test]
fn test_envelope_appends_messages() {
    let body = TimestampResponse { mtime: 12.5 };
    let json = serde_json::to_value(Envelope::new(body, Diagnostics::new())).unwrap();
    assert_eq!(json, serde_json::json!({"mtime": 12.5, "messages": []}));
}

// =============================================================================
// ERROR RESPONSE TESTS
// =============================================================================

#[test]
fn test_error_response_carries_exception_name() {
    let error = SpanviewError::TextUnreadable {
        path: PathBuf::from("/data/bio/doc.txt"),
        reason: "No such file or directory".into(),
    };
    let response = ErrorResponse::from_error(&error, Diagnostics::new());

    assert_eq!(response.exception, "unableToReadTextFile");
    assert!(response.message.contains("/data/bio/doc.txt"));
    assert_eq!(response.messages.len(), 1);
    assert_eq!(response.messages[0].1, "error");
}

#[test]
fn test_error_response_roundtrip() {
    let json = concat!(
        r#"{"exception":"accessDenied","message":"Access denied: /x","#,
        r#""messages":[["Access denied: /x","error"]]}"#
    );
    let response: ErrorResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.exception, "accessDenied");
    assert_eq!(response.messages[0].0, "Access denied: /x");
}
