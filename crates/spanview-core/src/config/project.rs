//! TOML-backed project configuration.
//!
//! A collection uses the `annotation.toml` found in its own directory or in
//! the nearest ancestor below the data root. Without one, the collection
//! gets an empty configuration.

use super::{flatten_nodes, HierarchyEntry, ProjectConfig, StyleTable, TypeNode};
use crate::primitives::{
    ANY_TYPE, ATTRIBUTE_TARGET_ROLE, ENTITY_NESTING_TYPE, ENTITY_WILDCARD, EVENT_WILDCARD,
    PROJECT_CONFIG_FILE,
};
use crate::SpanviewError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Annotation and visual configuration of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfiguration {
    pub entities: Vec<HierarchyEntry>,
    pub events: Vec<HierarchyEntry>,
    pub relations: Vec<HierarchyEntry>,
    pub entity_attributes: Vec<HierarchyEntry>,
    pub event_attributes: Vec<HierarchyEntry>,
    /// Type to display labels.
    pub labels: BTreeMap<String, Vec<String>>,
    /// Type (or default key) to drawing style.
    pub drawing: BTreeMap<String, StyleTable>,
    /// Keyboard key to type.
    pub hotkeys: BTreeMap<String, String>,
}

impl ProjectConfiguration {
    /// Parse a configuration; `origin` is only used for error context.
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self, SpanviewError> {
        toml::from_str(source).map_err(|e| SpanviewError::InvalidConfiguration {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, SpanviewError> {
        let source =
            std::fs::read_to_string(path).map_err(|e| SpanviewError::InvalidConfiguration {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::from_toml_str(&source, path)
    }

    /// Find the configuration file governing `directory`.
    ///
    /// Searches `directory` and its ancestors, never leaving `root`.
    #[must_use]
    pub fn locate(directory: &Path, root: &Path) -> Option<PathBuf> {
        directory
            .ancestors()
            .take_while(|dir| dir.starts_with(root))
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load the configuration governing `directory`, or an empty one.
    pub fn for_directory(directory: &Path, root: &Path) -> Result<Self, SpanviewError> {
        match Self::locate(directory, root) {
            Some(path) => {
                tracing::debug!("Using project configuration {}", path.display());
                Self::load(&path)
            }
            None => {
                tracing::debug!(
                    "No {} for {}, using empty configuration",
                    PROJECT_CONFIG_FILE,
                    directory.display()
                );
                Ok(Self::default())
            }
        }
    }

    fn span_nodes(&self) -> impl Iterator<Item = &TypeNode> {
        flatten_nodes(&self.entities)
            .into_iter()
            .chain(flatten_nodes(&self.events))
    }

    fn relation_nodes(&self) -> impl Iterator<Item = &TypeNode> {
        flatten_nodes(&self.relations)
            .into_iter()
            .filter(|n| n.storage != ENTITY_NESTING_TYPE)
    }

    fn all_nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.span_nodes()
            .chain(flatten_nodes(&self.relations))
            .chain(flatten_nodes(&self.entity_attributes))
            .chain(flatten_nodes(&self.event_attributes))
    }

    fn is_entity_type(&self, type_name: &str) -> bool {
        flatten_nodes(&self.entities)
            .iter()
            .any(|n| n.storage == type_name)
    }

    fn is_event_type(&self, type_name: &str) -> bool {
        flatten_nodes(&self.events)
            .iter()
            .any(|n| n.storage == type_name)
    }

    /// Does a single configured target accept `type_name`?
    fn target_matches(&self, target: &str, type_name: &str) -> bool {
        match target {
            ANY_TYPE => true,
            ENTITY_WILDCARD => self.is_entity_type(type_name),
            EVENT_WILDCARD => self.is_event_type(type_name),
            other => other == type_name,
        }
    }

    fn accepts(&self, targets: &[String], type_name: &str) -> bool {
        targets.iter().any(|t| self.target_matches(t, type_name))
    }
}

impl ProjectConfig for ProjectConfiguration {
    fn entity_hierarchy(&self) -> &[HierarchyEntry] {
        &self.entities
    }

    fn event_hierarchy(&self) -> &[HierarchyEntry] {
        &self.events
    }

    fn relation_hierarchy(&self) -> &[HierarchyEntry] {
        &self.relations
    }

    fn entity_attribute_hierarchy(&self) -> &[HierarchyEntry] {
        &self.entity_attributes
    }

    fn event_attribute_hierarchy(&self) -> &[HierarchyEntry] {
        &self.event_attributes
    }

    fn preferred_display_form(&self, type_name: &str) -> String {
        self.all_nodes()
            .find(|n| n.storage == type_name)
            .and_then(|n| n.display.clone())
            .unwrap_or_else(|| type_name.to_string())
    }

    fn labels_by_type(&self, type_name: &str) -> Option<Vec<String>> {
        self.labels.get(type_name).cloned()
    }

    fn attributes_for(&self, type_name: &str) -> Vec<String> {
        let scopes = [
            (&self.entity_attributes, ENTITY_WILDCARD),
            (&self.event_attributes, EVENT_WILDCARD),
        ];
        let mut attributes = Vec::new();
        for (hierarchy, implied_target) in scopes {
            for node in flatten_nodes(hierarchy) {
                let applies = match node.argument_targets(ATTRIBUTE_TARGET_ROLE) {
                    Some(targets) => self.accepts(targets, type_name),
                    None => self.target_matches(implied_target, type_name),
                };
                if applies && !attributes.contains(&node.storage) {
                    attributes.push(node.storage.clone());
                }
            }
        }
        attributes
    }

    fn drawing_config_by_type(&self, type_name: &str) -> Option<&StyleTable> {
        self.drawing.get(type_name)
    }

    fn relation_types_from(&self, type_name: &str) -> Vec<String> {
        let mut types = Vec::new();
        for node in self.relation_nodes() {
            let from_ok = node
                .args
                .first()
                .is_some_and(|arg| self.accepts(&arg.targets, type_name));
            if from_ok && !types.contains(&node.storage) {
                types.push(node.storage.clone());
            }
        }
        types
    }

    fn entity_types(&self) -> Vec<String> {
        flatten_nodes(&self.entities)
            .into_iter()
            .map(|n| n.storage.clone())
            .collect()
    }

    fn event_types(&self) -> Vec<String> {
        flatten_nodes(&self.events)
            .into_iter()
            .map(|n| n.storage.clone())
            .collect()
    }

    fn arc_types_from_to(&self, from: &str, to: &str) -> Vec<String> {
        let mut arcs: Vec<String> = Vec::new();

        if let Some(node) = self.span_nodes().find(|n| n.storage == from) {
            for arg in &node.args {
                if self.accepts(&arg.targets, to) && !arcs.contains(&arg.role) {
                    arcs.push(arg.role.clone());
                }
            }
        }

        for node in self.relation_nodes() {
            if let [first, second, ..] = node.args.as_slice() {
                if self.accepts(&first.targets, from)
                    && self.accepts(&second.targets, to)
                    && !arcs.contains(&node.storage)
                {
                    arcs.push(node.storage.clone());
                }
            }
        }

        arcs
    }

    fn is_relation_type(&self, type_name: &str) -> bool {
        flatten_nodes(&self.relations)
            .iter()
            .any(|n| n.storage == type_name)
    }

    fn is_configured_type(&self, type_name: &str) -> bool {
        self.all_nodes().any(|n| n.storage == type_name)
    }

    fn label_types(&self) -> Vec<String> {
        self.labels.keys().cloned().collect()
    }

    fn drawing_types(&self) -> Vec<String> {
        self.drawing.keys().cloned().collect()
    }

    fn key_bindings(&self) -> &BTreeMap<String, String> {
        &self.hotkeys
    }
}

// =============================================================================
// TESTS
// =============================================================================
