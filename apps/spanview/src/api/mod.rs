//! # Spanview HTTP API Module
//!
//! This module implements the HTTP JSON API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /collection?collection=` - Collection listing and type catalog
//! - `GET /document?collection=&document=` - Document projection
//! - `GET /timestamp?collection=&document=` - Annotation modification time
//!
//! ## Configuration (Environment Variables)
//!
//! - `SPANVIEW_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all
//!   (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `spanview::api::*`)
pub use handlers::{
    collection_handler, document_handler, health_handler, status_for, timestamp_handler,
};
pub use types::{
    CollectionQuery, DocumentQuery, Envelope, ErrorResponse, HealthResponse, Message,
    TimestampResponse, messages_from,
};

use crate::settings::Settings;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use spanview_core::{
    AccessControl, CollectionListing, Diagnostics, DocumentProjection, DocumentProjector,
    HiddenEntryFilter, SpanviewError, TypeCatalog, list_collection, resolve_document,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: read-only settings and the projection collaborators.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub projector: Arc<DocumentProjector>,
    pub access: Arc<dyn AccessControl>,
}

impl AppState {
    /// Create state with the default store, verifier and access control.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let projector = DocumentProjector::new(settings.projection_options());
        Self {
            settings: Arc::new(settings),
            projector: Arc::new(projector),
            access: Arc::new(HiddenEntryFilter),
        }
    }

    /// Replace the access-control collaborator.
    #[must_use]
    pub fn with_access(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = access;
        self
    }

    pub fn list_collection(
        &self,
        collection: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<CollectionListing, SpanviewError> {
        list_collection(
            &self.settings.data_dir,
            collection,
            self.access.as_ref(),
            diagnostics,
        )
    }

    /// Only the type catalog of a collection.
    pub fn type_catalog(
        &self,
        collection: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<TypeCatalog, SpanviewError> {
        self.list_collection(collection, diagnostics)
            .map(|listing| listing.catalog)
    }

    pub fn project_document(
        &self,
        collection: &str,
        document: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<DocumentProjection, SpanviewError> {
        let resolved = resolve_document(
            &self.settings.data_dir,
            collection,
            document,
            self.access.as_ref(),
        )?;
        self.projector
            .project(&resolved.path, &resolved.collection.root, diagnostics)
    }

    pub fn document_timestamp(
        &self,
        collection: &str,
        document: &str,
    ) -> Result<f64, SpanviewError> {
        spanview_core::document_timestamp(
            &self.settings.data_dir,
            collection,
            document,
            self.access.as_ref(),
        )
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `SPANVIEW_CORS_ORIGINS`:
/// - If "*": allows all origins
/// - If not set: localhost only
/// - Otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("SPANVIEW_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (SPANVIEW_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins in SPANVIEW_CORS_ORIGINS, using localhost");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => build_localhost_cors(),
    }
}

/// CORS layer allowing only localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/collection", get(handlers::collection_handler))
        .route("/document", get(handlers::document_handler))
        .route("/timestamp", get(handlers::timestamp_handler))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, settings: Settings) -> Result<(), SpanviewError> {
    let router = create_router(AppState::new(settings));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SpanviewError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Spanview HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| SpanviewError::IoError(format!("Server error: {}", e)))
}
