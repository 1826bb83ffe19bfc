//! # spanview-core
//!
//! The projection engine for Spanview - THE LOGIC.
//!
//! This crate turns on-disk annotation projects into the JSON models an
//! annotation client renders:
//! - the **type catalog** of a collection, flattened from its project
//!   configuration (`catalog`)
//! - the **document projection** of one document: text, sentence and token
//!   offsets, annotations, comments (`document`)
//!
//! ## Layout
//!
//! ```text
//! config ──► catalog ──────────────┐
//!   │                              ├──► collection (listing)
//!   └──► verify ──┐                │
//! store ──────────┼──► document ◄──┘ (path resolution)
//! boundary ───────┘
//! ```
//!
//! ## Architectural Constraints
//!
//! - Synchronous and stateless: every call re-reads the files it needs
//! - No async, no network dependencies
//! - Fatal problems are `SpanviewError` values; configuration defects and
//!   annotation parse failures go to `Diagnostics`

// =============================================================================
// MODULES
// =============================================================================

pub mod boundary;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod primitives;
pub mod store;
pub mod types;
pub mod verify;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AnnotationSet, ArgRef, Attribute, AttributeValue, CommentRow, CommentTarget, Equiv, Event,
    FailedLine, Note, Relation, Span, SpanviewError, Textbound,
};

// =============================================================================
// RE-EXPORTS: Configuration & Catalog
// =============================================================================

pub use catalog::{
    ArcItem, AttributeTypeItem, RelationTypeItem, SpanTypeItem, TypeCatalog, VisualTypeItem,
};
pub use config::{HierarchyEntry, ProjectConfig, ProjectConfiguration, StyleValue, TypeNode};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

// =============================================================================
// RE-EXPORTS: Documents & Collections
// =============================================================================

pub use boundary::{BoundaryDetector, Locale};
pub use collection::{
    AccessControl, CollectionListing, HiddenEntryFilter, ListingItem, ResolvedCollection,
    ResolvedDocument, document_timestamp, list_collection, resolve_collection, resolve_document,
};
pub use document::{
    DocumentProjection, DocumentProjector, ProjectionOptions, client_text,
    merge_sentence_boundaries,
};
pub use store::{AnnotationStore, StandoffStore};
pub use verify::{Issue, IssueKind, SchemaVerifier, Verifier};
