//! # Collections
//!
//! Path resolution below the data root, access control, and the collection
//! listing that carries the type catalog.
//!
//! Collections are addressed by paths relative to the data root
//! (`/`, `/bio/`, `bio/events`). Resolved directories are canonicalised and
//! must stay below the canonical root.

use crate::catalog::TypeCatalog;
use crate::config::ProjectConfiguration;
use crate::diagnostics::Diagnostics;
use crate::primitives::{JOINED_ANN_FILE_SUFFIX, README_FILE, TEXT_FILE_SUFFIX};
use crate::store::{file_mtime, with_suffix};
use crate::types::SpanviewError;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

// =============================================================================
// ACCESS CONTROL
// =============================================================================

/// Read permission check, consulted for every resolved path.
pub trait AccessControl: Send + Sync {
    /// `relative` is the path below the data root; empty for the root.
    fn allowed_to_read(&self, relative: &Path) -> bool;
}

/// Denies entries whose name starts with `.` or `hidden_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenEntryFilter;

impl HiddenEntryFilter {
    fn is_hidden(name: &str) -> bool {
        name.starts_with('.') || name.starts_with("hidden_")
    }
}

impl AccessControl for HiddenEntryFilter {
    fn allowed_to_read(&self, relative: &Path) -> bool {
        !relative.components().any(|c| match c {
            Component::Normal(name) => name.to_str().is_none_or(Self::is_hidden),
            _ => false,
        })
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// A collection directory resolved below the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCollection {
    /// Canonical data root.
    pub root: PathBuf,
    /// Canonical collection directory.
    pub directory: PathBuf,
    /// `directory` relative to `root`.
    pub relative: PathBuf,
}

impl ResolvedCollection {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Parent collection relative to the root, `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<String> {
        if self.is_root() {
            return None;
        }
        let parent = self.relative.parent().unwrap_or(Path::new(""));
        Some(slash_path(parent))
    }
}

/// A document path resolved inside a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    pub collection: ResolvedCollection,
    /// Document path without suffix.
    pub path: PathBuf,
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a collection path below `data_root`.
///
/// # Errors
///
/// `CollectionNotAccessible` if the root or directory cannot be resolved,
/// `AccessDenied` if it escapes the root or access control refuses it.
pub fn resolve_collection(
    data_root: &Path,
    collection: &str,
    access: &dyn AccessControl,
) -> Result<ResolvedCollection, SpanviewError> {
    let root = data_root
        .canonicalize()
        .map_err(|e| SpanviewError::CollectionNotAccessible {
            path: data_root.to_path_buf(),
            reason: e.to_string(),
        })?;

    let requested = root.join(collection.trim_matches('/'));
    let directory = requested
        .canonicalize()
        .map_err(|e| SpanviewError::CollectionNotAccessible {
            path: requested.clone(),
            reason: e.to_string(),
        })?;

    let relative = directory
        .strip_prefix(&root)
        .map_err(|_| SpanviewError::AccessDenied {
            path: requested.clone(),
        })?
        .to_path_buf();

    if !access.allowed_to_read(&relative) {
        return Err(SpanviewError::AccessDenied { path: requested });
    }

    Ok(ResolvedCollection {
        root,
        directory,
        relative,
    })
}

/// Resolve a document name inside a collection.
///
/// # Errors
///
/// `AccessDenied` for names containing separators or `..`, or names access
/// control refuses; any error of [`resolve_collection`].
pub fn resolve_document(
    data_root: &Path,
    collection: &str,
    document: &str,
    access: &dyn AccessControl,
) -> Result<ResolvedDocument, SpanviewError> {
    let collection = resolve_collection(data_root, collection, access)?;
    let path = collection.directory.join(document);

    let malformed = document.is_empty()
        || document.contains(['/', '\\'])
        || document == ".."
        || document.contains("..");
    if malformed || !access.allowed_to_read(&collection.relative.join(document)) {
        return Err(SpanviewError::AccessDenied { path });
    }

    Ok(ResolvedDocument { collection, path })
}

/// Modification time of a document's joined annotation file, `-1` if absent.
///
/// # Errors
///
/// Any error of [`resolve_document`].
pub fn document_timestamp(
    data_root: &Path,
    collection: &str,
    document: &str,
    access: &dyn AccessControl,
) -> Result<f64, SpanviewError> {
    let resolved = resolve_document(data_root, collection, document, access)?;
    Ok(file_mtime(&with_suffix(&resolved.path, JOINED_ANN_FILE_SUFFIX)))
}

// =============================================================================
// LISTING
// =============================================================================

/// One row of the collection browser.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingItem {
    /// `["c", null, name]`
    Collection(String),
    /// `["d", null, name, mtime]`
    Document { name: String, mtime: f64 },
}

impl Serialize for ListingItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Collection(name) => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("c")?;
                seq.serialize_element(&Option::<()>::None)?;
                seq.serialize_element(name)?;
                seq.end()
            }
            Self::Document { name, mtime } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("d")?;
                seq.serialize_element(&Option::<()>::None)?;
                seq.serialize_element(name)?;
                seq.serialize_element(mtime)?;
                seq.end()
            }
        }
    }
}

/// Collection listing with the collection's type catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionListing {
    pub items: Vec<ListingItem>,
    pub header: Vec<(String, String)>,
    pub parent: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub catalog: TypeCatalog,
}

/// List a collection: sub-collections, documents and the type catalog.
///
/// # Errors
///
/// Any error of [`resolve_collection`]; `CollectionNotAccessible` if the
/// directory cannot be listed; `InvalidConfiguration` if its project
/// configuration is malformed.
pub fn list_collection(
    data_root: &Path,
    collection: &str,
    access: &dyn AccessControl,
    diagnostics: &mut Diagnostics,
) -> Result<CollectionListing, SpanviewError> {
    let resolved = resolve_collection(data_root, collection, access)?;
    let not_accessible = |e: std::io::Error| SpanviewError::CollectionNotAccessible {
        path: resolved.directory.clone(),
        reason: e.to_string(),
    };

    let mut collections = Vec::new();
    let mut documents = Vec::new();
    let text_suffix = format!(".{TEXT_FILE_SUFFIX}");

    for entry in std::fs::read_dir(&resolved.directory).map_err(not_accessible)? {
        let entry = entry.map_err(not_accessible)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !access.allowed_to_read(&resolved.relative.join(&name)) {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            collections.push(name);
        } else if let Some(base) = name.strip_suffix(&text_suffix) {
            let ann = with_suffix(&resolved.directory.join(base), JOINED_ANN_FILE_SUFFIX);
            documents.push((base.to_string(), file_mtime(&ann)));
        }
    }
    collections.sort();
    documents.sort_by(|a, b| a.0.cmp(&b.0));

    let mut items: Vec<ListingItem> = collections
        .into_iter()
        .map(ListingItem::Collection)
        .collect();
    if !resolved.is_root() {
        items.push(ListingItem::Collection("..".to_string()));
    }
    items.extend(
        documents
            .into_iter()
            .map(|(name, mtime)| ListingItem::Document { name, mtime }),
    );

    let config = ProjectConfiguration::for_directory(&resolved.directory, &resolved.root)?;
    let catalog = TypeCatalog::build(&config, diagnostics);
    let description = std::fs::read_to_string(resolved.directory.join(README_FILE)).ok();

    tracing::debug!(
        collection = %resolved.relative.display(),
        items = items.len(),
        "Listed collection"
    );

    Ok(CollectionListing {
        items,
        header: vec![
            ("Document".to_string(), "string".to_string()),
            ("Modified".to_string(), "time".to_string()),
        ],
        parent: resolved.parent(),
        description,
        catalog,
    })
}

// =============================================================================
// TESTS
// =============================================================================
