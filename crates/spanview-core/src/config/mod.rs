//! # Project Configuration
//!
//! The type hierarchy reader: annotation type trees, drawing configuration,
//! labels and key bindings for one collection directory.
//!
//! - `TypeNode` / `HierarchyEntry`: ordered type forests with separators
//! - `StyleValue` / `StyleTable`: drawing configuration entries
//! - `ProjectConfig`: the read-only accessor the projectors are written against
//! - `ProjectConfiguration`: the TOML-backed implementation

mod project;

pub use project::ProjectConfiguration;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// TYPE NODES
// =============================================================================

/// A declared argument role and the types it may point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentRole {
    pub role: String,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Fold `declared` into `roles`: a repeated role extends the targets of its
/// first declaration instead of adding a second entry.
fn merge_role(roles: &mut Vec<ArgumentRole>, declared: ArgumentRole) {
    match roles.iter_mut().find(|r| r.role == declared.role) {
        Some(existing) => {
            for target in declared.targets {
                if !existing.targets.contains(&target) {
                    existing.targets.push(target);
                }
            }
        }
        None => roles.push(declared),
    }
}

fn deserialize_roles<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ArgumentRole>, D::Error> {
    let mut roles = Vec::new();
    for declared in Vec::<ArgumentRole>::deserialize(deserializer)? {
        merge_role(&mut roles, declared);
    }
    Ok(roles)
}

/// A node of a type hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    /// Canonical storage identifier.
    #[serde(rename = "type")]
    pub storage: String,
    /// Preferred display form, defaults to the storage identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Shown for reference only; not used by annotations.
    #[serde(default)]
    pub unused: bool,
    /// Argument roles in first-declaration order, one entry per role.
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub args: Vec<ArgumentRole>,
    /// Special-argument tags such as `<REL-TYPE>`.
    #[serde(default)]
    pub special: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub children: Vec<HierarchyEntry>,
}

impl TypeNode {
    #[must_use]
    pub fn new(storage: impl Into<String>) -> Self {
        Self {
            storage: storage.into(),
            display: None,
            unused: false,
            args: Vec::new(),
            special: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Add an argument role, or more targets to an already declared one.
    #[must_use]
    pub fn with_arg<I, S>(mut self, role: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        merge_role(
            &mut self.args,
            ArgumentRole {
                role: role.into(),
                targets: targets.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Append a child entry.
    #[must_use]
    pub fn with_child(mut self, child: HierarchyEntry) -> Self {
        self.children.push(child);
        self
    }

    /// Add values under a special-argument tag.
    #[must_use]
    pub fn with_special<I, S>(mut self, tag: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special
            .entry(tag.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn storage_form(&self) -> &str {
        &self.storage
    }

    /// Declared role names, in declaration order.
    pub fn arg_roles(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|a| a.role.as_str())
    }

    /// Configured targets of one role.
    #[must_use]
    pub fn argument_targets(&self, role: &str) -> Option<&[String]> {
        self.args
            .iter()
            .find(|a| a.role == role)
            .map(|a| a.targets.as_slice())
    }

    /// Values listed under a special-argument tag.
    #[must_use]
    pub fn special_arguments(&self, tag: &str) -> Option<&[String]> {
        self.special.get(tag).map(Vec::as_slice)
    }
}

/// Marker table `{ separator = true }` in a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparatorMarker {
    pub separator: bool,
}

/// One entry of an ordered hierarchy: a type node or a visual separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HierarchyEntry {
    Node(TypeNode),
    Separator(SeparatorMarker),
}

impl HierarchyEntry {
    #[must_use]
    pub fn separator() -> Self {
        Self::Separator(SeparatorMarker { separator: true })
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&TypeNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Separator(_) => None,
        }
    }
}

impl From<TypeNode> for HierarchyEntry {
    fn from(node: TypeNode) -> Self {
        Self::Node(node)
    }
}

/// All nodes of a forest in depth-first pre-order, separators skipped.
#[must_use]
pub fn flatten_nodes(entries: &[HierarchyEntry]) -> Vec<&TypeNode> {
    let mut nodes = Vec::new();
    let mut stack: Vec<&HierarchyEntry> = entries.iter().rev().collect();
    while let Some(entry) = stack.pop() {
        if let HierarchyEntry::Node(node) = entry {
            nodes.push(node);
            stack.extend(node.children.iter().rev());
        }
    }
    nodes
}

// =============================================================================
// DRAWING CONFIGURATION
// =============================================================================

/// A drawing attribute value: one scalar, or one entry per attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Scalar(String),
    List(Vec<String>),
}

/// Style attributes of one type, keyed by attribute name.
pub type StyleTable = BTreeMap<String, StyleValue>;

// =============================================================================
// ACCESSOR
// =============================================================================

/// Read-only view of a project configuration.
///
/// Lookups for optional configuration return `Option`; absence is never an
/// error.
pub trait ProjectConfig {
    fn entity_hierarchy(&self) -> &[HierarchyEntry];
    fn event_hierarchy(&self) -> &[HierarchyEntry];
    fn relation_hierarchy(&self) -> &[HierarchyEntry];
    fn entity_attribute_hierarchy(&self) -> &[HierarchyEntry];
    fn event_attribute_hierarchy(&self) -> &[HierarchyEntry];

    /// Name shown to users for a type.
    fn preferred_display_form(&self, type_name: &str) -> String;

    /// Configured labels, longest first.
    fn labels_by_type(&self, type_name: &str) -> Option<Vec<String>>;

    /// Attribute types applicable to annotations of `type_name`.
    fn attributes_for(&self, type_name: &str) -> Vec<String>;

    fn drawing_config_by_type(&self, type_name: &str) -> Option<&StyleTable>;

    /// Relation types whose first argument accepts `type_name`.
    fn relation_types_from(&self, type_name: &str) -> Vec<String>;

    fn entity_types(&self) -> Vec<String>;
    fn event_types(&self) -> Vec<String>;

    /// Arc types (argument roles and relations) leading from `from` to `to`.
    fn arc_types_from_to(&self, from: &str, to: &str) -> Vec<String>;

    fn is_relation_type(&self, type_name: &str) -> bool;

    /// True if the type appears in any annotation hierarchy.
    fn is_configured_type(&self, type_name: &str) -> bool;

    /// Types with a label entry, in table order.
    fn label_types(&self) -> Vec<String>;

    /// Types with a drawing entry (defaults included), in table order.
    fn drawing_types(&self) -> Vec<String>;

    /// Key bindings, key to type.
    fn key_bindings(&self) -> &BTreeMap<String, String>;
}
