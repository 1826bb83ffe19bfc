//! # Core Type Definitions
//!
//! This module contains the shared data model of the projection engine:
//! - Character offset spans (`Span`)
//! - Parsed standoff annotation records (`Textbound`, `Event`, `Relation`, ...)
//! - The snapshot returned by an annotation store (`AnnotationSet`)
//! - Wire rows serialised into the document projection
//! - Error types (`SpanviewError`)
//!
//! ## Offsets
//!
//! All offsets are counted in Unicode scalar values (chars), never bytes,
//! because the standoff format and the client both address text by character.

use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// SPANS
// =============================================================================

/// A half-open `[start, end)` character range, serialised as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span(pub usize, pub usize);

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self(start, end)
    }

    /// Start offset (inclusive).
    #[must_use]
    pub const fn start(self) -> usize {
        self.0
    }

    /// End offset (exclusive).
    #[must_use]
    pub const fn end(self) -> usize {
        self.1
    }

    /// True if this span starts before `offset` and ends after it.
    #[must_use]
    pub const fn straddles(self, offset: usize) -> bool {
        self.0 < offset && self.1 > offset
    }
}

// =============================================================================
// ANNOTATION RECORDS
// =============================================================================

/// A role-labelled reference to another annotation (`Theme:T2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgRef {
    pub role: String,
    pub id: String,
}

impl ArgRef {
    #[must_use]
    pub fn new(role: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            id: id.into(),
        }
    }
}

/// A typed character span over the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Textbound {
    pub id: String,
    pub type_name: String,
    pub start: usize,
    pub end: usize,
    /// The covered text as stored in the annotation file.
    pub text: String,
}

impl Textbound {
    #[must_use]
    pub fn span(&self) -> Span {
        Span(self.start, self.end)
    }
}

/// An event anchored on a trigger textbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub type_name: String,
    pub trigger: String,
    pub args: Vec<ArgRef>,
}

/// A binary relation between two annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub id: String,
    pub type_name: String,
    pub arg1: ArgRef,
    pub arg2: ArgRef,
}

/// Value of an attribute annotation.
///
/// Binary attributes carry no value and serialise as `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Flag,
    Value(String),
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Flag => serializer.serialize_bool(true),
            Self::Value(value) => serializer.serialize_str(value),
        }
    }
}

/// An attribute attached to another annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: String,
    pub type_name: String,
    pub target: String,
    pub value: AttributeValue,
}

/// An equivalence class over annotation ids (`*\tEquiv T1 T2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equiv {
    pub type_name: String,
    pub members: Vec<String>,
}

/// A one-line comment attached to an annotation (`#1\tAnnotatorNotes T1\tnote`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub type_name: String,
    pub target: String,
    pub tail: String,
}

/// A line the store could not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLine {
    /// Zero-based line number across all input files, in read order.
    pub line: usize,
    /// Raw line content.
    pub text: String,
}

// =============================================================================
// ANNOTATION SET
// =============================================================================

/// Snapshot of one document's annotations as read by an annotation store.
///
/// Records keep their file order within each kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSet {
    pub textbounds: Vec<Textbound>,
    pub events: Vec<Event>,
    pub relations: Vec<Relation>,
    pub attributes: Vec<Attribute>,
    pub equivs: Vec<Equiv>,
    pub notes: Vec<Note>,
    pub failed_lines: Vec<FailedLine>,
    /// Modification time in seconds since the epoch, `-1` if unknown.
    pub mtime: f64,
    /// Creation (or change) time in seconds since the epoch, `-1` if unknown.
    pub ctime: f64,
    /// Every file actually read to build this set.
    pub input_files: Vec<PathBuf>,
}

impl Default for AnnotationSet {
    fn default() -> Self {
        Self {
            textbounds: Vec::new(),
            events: Vec::new(),
            relations: Vec::new(),
            attributes: Vec::new(),
            equivs: Vec::new(),
            notes: Vec::new(),
            failed_lines: Vec::new(),
            mtime: crate::primitives::MISSING_TIMESTAMP,
            ctime: crate::primitives::MISSING_TIMESTAMP,
            input_files: Vec::new(),
        }
    }
}

impl AnnotationSet {
    /// Create an empty set with unknown timestamps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the type of the annotation with the given id, if any.
    #[must_use]
    pub fn type_of(&self, id: &str) -> Option<&str> {
        self.textbounds
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.type_name.as_str())
            .or_else(|| {
                self.events
                    .iter()
                    .find(|e| e.id == id)
                    .map(|e| e.type_name.as_str())
            })
            .or_else(|| {
                self.relations
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| r.type_name.as_str())
            })
    }

    /// Check whether an annotation with the given id exists.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.type_of(id).is_some() || self.attributes.iter().any(|a| a.id == id)
    }
}

// =============================================================================
// WIRE ROWS
// =============================================================================

/// `[id, type, start, end]` for entities and triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextboundRow(pub String, pub String, pub usize, pub usize);

impl From<&Textbound> for TextboundRow {
    fn from(tb: &Textbound) -> Self {
        Self(tb.id.clone(), tb.type_name.clone(), tb.start, tb.end)
    }
}

/// `[id, trigger, [[role, id], ...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow(pub String, pub String, pub Vec<(String, String)>);

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        let args = event
            .args
            .iter()
            .map(|a| (a.role.clone(), a.id.clone()))
            .collect();
        Self(event.id.clone(), event.trigger.clone(), args)
    }
}

/// `[id, type, arg1, arg2]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRow(pub String, pub String, pub String, pub String);

impl From<&Relation> for RelationRow {
    fn from(rel: &Relation) -> Self {
        Self(
            rel.id.clone(),
            rel.type_name.clone(),
            rel.arg1.id.clone(),
            rel.arg2.id.clone(),
        )
    }
}

/// `[id, type, target, value]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRow(pub String, pub String, pub String, pub AttributeValue);

impl From<&Attribute> for AttributeRow {
    fn from(attr: &Attribute) -> Self {
        Self(
            attr.id.clone(),
            attr.type_name.clone(),
            attr.target.clone(),
            attr.value.clone(),
        )
    }
}

/// `["*", type, id, id, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivRow {
    pub type_name: String,
    pub members: Vec<String>,
}

impl From<&Equiv> for EquivRow {
    fn from(eq: &Equiv) -> Self {
        Self {
            type_name: eq.type_name.clone(),
            members: eq.members.clone(),
        }
    }
}

impl Serialize for EquivRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.members.len() + 2))?;
        seq.serialize_element("*")?;
        seq.serialize_element(&self.type_name)?;
        for member in &self.members {
            seq.serialize_element(member)?;
        }
        seq.end()
    }
}

/// What a comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    /// An annotation id, serialised as the bare id.
    Annotation(String),
    /// A sentence index, serialised as `["sent", n]`.
    Sentence(usize),
}

impl Serialize for CommentTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Annotation(id) => serializer.serialize_str(id),
            Self::Sentence(index) => ("sent", index).serialize(serializer),
        }
    }
}

/// `[target, type, text]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRow(pub CommentTarget, pub String, pub String);

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Fatal errors of the projection engine.
///
/// Every variant aborts the request that raised it; no partial projection is
/// returned. Recoverable configuration defects are reported through
/// [`crate::diagnostics::Diagnostics`] instead.
#[derive(Debug, Error)]
pub enum SpanviewError {
    /// The requested document path is a directory.
    #[error("{} is a directory, not a document", path.display())]
    DirectoryNotDocument { path: PathBuf },

    /// The primary text file is missing, unreadable or not valid UTF-8.
    #[error("Unable to read text file {}: {reason}", path.display())]
    TextUnreadable { path: PathBuf, reason: String },

    /// The access-control collaborator refused the read.
    #[error("Access denied: {}", path.display())]
    AccessDenied { path: PathBuf },

    /// A collection directory could not be listed.
    #[error("Collection not accessible: {} ({reason})", path.display())]
    CollectionNotAccessible { path: PathBuf, reason: String },

    /// A project or settings file could not be read or parsed.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    InvalidConfiguration { path: PathBuf, reason: String },

    /// An annotation file exists but could not be read.
    #[error("Unable to read annotation file {}: {reason}", path.display())]
    AnnotationsUnreadable { path: PathBuf, reason: String },

    /// The verification engine failed.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Socket or file I/O outside the document model.
    #[error("IO error: {0}")]
    IoError(String),
}

impl SpanviewError {
    /// The wire name reported to the client in the `exception` field.
    #[must_use]
    pub const fn exception(&self) -> &'static str {
        match self {
            Self::DirectoryNotDocument { .. } => "isDirectoryError",
            Self::TextUnreadable { .. } => "unableToReadTextFile",
            Self::AccessDenied { .. } => "accessDenied",
            Self::CollectionNotAccessible { .. } => "collectionNotAccessible",
            Self::InvalidConfiguration { .. } => "invalidConfiguration",
            Self::AnnotationsUnreadable { .. } => "annotationFileUnreadable",
            Self::VerificationFailed(_) => "verificationFailed",
            Self::IoError(_) => "ioError",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
