//! # Type Catalog
//!
//! Flattens the project type hierarchies into the client type catalog.
//!
//! Each hierarchy category has its own projector:
//! - span types (entities, events): style, hotkey, arcs with reachable targets
//! - relation types: arc style, `properties`, raw argument constraints
//! - attribute types: per-value styles, glyph fallback, glyph position
//! - unconfigured types: visual-only entries for labels and drawing keys
//!
//! Projection is a pure function of the configuration. Defects in the
//! drawing configuration are reported to [`Diagnostics`] and degrade to a
//! safe fallback.

use crate::config::{HierarchyEntry, ProjectConfig, StyleTable, StyleValue, TypeNode};
use crate::diagnostics::Diagnostics;
use crate::primitives::{
    ARC_DRAWING_ATTRIBUTES, ATTR_DRAWING_ATTRIBUTES, ENTITY_NESTING_TYPE, GLYPH_KEY,
    GLYPH_POS_KEY, GLYPH_POSITIONS, POSITION_KEY, REL_TYPE_TAG, SPAN_DRAWING_ATTRIBUTES,
    VALUE_ROLE, VISUAL_ARC_DEFAULT, VISUAL_ATTR_DEFAULT, VISUAL_SPAN_DEFAULT,
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Type to hotkey, the inverse of the configured key bindings.
pub type HotkeyIndex = BTreeMap<String, String>;

/// Invert key bindings (key to type) into a type to key index.
///
/// When several keys name one type, the last key in key order wins.
#[must_use]
pub fn hotkeys_by_type(bindings: &BTreeMap<String, String>) -> HotkeyIndex {
    bindings
        .iter()
        .map(|(key, type_name)| (type_name.clone(), key.clone()))
        .collect()
}

// =============================================================================
// PROJECTED ITEMS
// =============================================================================

/// Fields shared by every projected type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeHeader {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub unused: bool,
    pub labels: Option<Vec<String>>,
}

impl TypeHeader {
    fn new(config: &dyn ProjectConfig, type_name: &str, unused: bool) -> Self {
        Self {
            name: config.preferred_display_form(type_name),
            type_name: type_name.to_string(),
            unused,
            labels: config.labels_by_type(type_name),
        }
    }
}

/// An arc leaving a span type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArcItem {
    #[serde(rename = "type")]
    pub type_name: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    #[serde(flatten)]
    pub style: StyleTable,
    /// Entity and event types this arc can point at.
    pub targets: Vec<String>,
}

/// A projected entity or event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanTypeItem {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub attributes: Vec<String>,
    #[serde(flatten)]
    pub style: StyleTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arcs: Vec<ArcItem>,
    pub children: Vec<Option<SpanTypeItem>>,
}

/// Argument constraint of a relation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationArg {
    pub role: String,
    /// Target types exactly as configured, wildcards unexpanded.
    pub targets: Vec<String>,
}

/// A projected relation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationTypeItem {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub attributes: Vec<String>,
    pub properties: BTreeMap<String, bool>,
    #[serde(flatten)]
    pub style: StyleTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    pub args: Vec<RelationArg>,
    pub children: Vec<Option<RelationTypeItem>>,
}

/// Per-value styles of an attribute, in value order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueStyles(pub Vec<(String, BTreeMap<String, String>)>);

impl ValueStyles {
    /// Style table of one value.
    #[must_use]
    pub fn get(&self, value: &str) -> Option<&BTreeMap<String, String>> {
        self.0.iter().find(|(v, _)| v == value).map(|(_, style)| style)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ValueStyles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, style) in &self.0 {
            map.serialize_entry(value, style)?;
        }
        map.end()
    }
}

/// A projected attribute type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeTypeItem {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub values: ValueStyles,
}

/// A type known only from labels or drawing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualTypeItem {
    #[serde(flatten)]
    pub header: TypeHeader,
    #[serde(flatten)]
    pub style: StyleTable,
}

/// The complete type catalog of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCatalog {
    pub event_types: Vec<Option<SpanTypeItem>>,
    pub entity_types: Vec<Option<SpanTypeItem>>,
    pub event_attribute_types: Vec<AttributeTypeItem>,
    pub entity_attribute_types: Vec<AttributeTypeItem>,
    pub relation_types: Vec<Option<RelationTypeItem>>,
    pub unconfigured_types: Vec<VisualTypeItem>,
}

impl TypeCatalog {
    /// Project every hierarchy of `config`.
    pub fn build(config: &dyn ProjectConfig, diagnostics: &mut Diagnostics) -> Self {
        let hotkeys = hotkeys_by_type(config.key_bindings());

        let catalog = Self {
            event_types: project_span_types(config.event_hierarchy(), config, &hotkeys),
            entity_types: project_span_types(config.entity_hierarchy(), config, &hotkeys),
            event_attribute_types: project_attribute_types(
                config.event_attribute_hierarchy(),
                config,
                diagnostics,
            ),
            entity_attribute_types: project_attribute_types(
                config.entity_attribute_hierarchy(),
                config,
                diagnostics,
            ),
            relation_types: project_relation_types(config.relation_hierarchy(), config, &hotkeys),
            unconfigured_types: project_visual_types(&unconfigured_types(config), config),
        };

        tracing::debug!(
            events = catalog.event_types.len(),
            entities = catalog.entity_types.len(),
            relations = catalog.relation_types.len(),
            unconfigured = catalog.unconfigured_types.len(),
            "Built type catalog"
        );
        catalog
    }
}

// =============================================================================
// STYLE RESOLUTION
// =============================================================================

/// Drawing config of a type, else the class default, else nothing.
fn resolve_drawing<'c>(
    config: &'c dyn ProjectConfig,
    type_name: &str,
    default_key: &str,
) -> Option<&'c StyleTable> {
    config
        .drawing_config_by_type(type_name)
        .or_else(|| config.drawing_config_by_type(default_key))
}

/// Copy only the recognized keys of a drawing table.
fn select_style<'k>(
    table: Option<&StyleTable>,
    keys: impl IntoIterator<Item = &'k str>,
) -> StyleTable {
    let Some(table) = table else {
        return StyleTable::new();
    };
    keys.into_iter()
        .filter_map(|key| table.get(key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

fn is_nesting(node: &TypeNode) -> bool {
    node.storage_form() == ENTITY_NESTING_TYPE
}

// =============================================================================
// SPAN TYPES
// =============================================================================

/// Project an entity or event forest.
///
/// Separators become `None` in place; nesting pseudo-types are omitted.
pub fn project_span_types(
    entries: &[HierarchyEntry],
    config: &dyn ProjectConfig,
    hotkeys: &HotkeyIndex,
) -> Vec<Option<SpanTypeItem>> {
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            HierarchyEntry::Separator(_) => items.push(None),
            HierarchyEntry::Node(node) if is_nesting(node) => {}
            HierarchyEntry::Node(node) => {
                items.push(Some(project_span_node(node, config, hotkeys)));
            }
        }
    }
    items
}

fn project_span_node(
    node: &TypeNode,
    config: &dyn ProjectConfig,
    hotkeys: &HotkeyIndex,
) -> SpanTypeItem {
    let type_name = node.storage_form();
    let style = select_style(
        resolve_drawing(config, type_name, VISUAL_SPAN_DEFAULT),
        SPAN_DRAWING_ATTRIBUTES.iter().copied(),
    );

    SpanTypeItem {
        header: TypeHeader::new(config, type_name, node.unused),
        attributes: config.attributes_for(type_name),
        style,
        hotkey: hotkeys.get(type_name).cloned(),
        arcs: project_arcs(node, config, hotkeys),
        children: project_span_types(&node.children, config, hotkeys),
    }
}

/// Relation types from this type, then its own roles; first occurrence wins.
fn project_arcs(
    node: &TypeNode,
    config: &dyn ProjectConfig,
    hotkeys: &HotkeyIndex,
) -> Vec<ArcItem> {
    let type_name = node.storage_form();
    // Relations are already arcs: they never get targets of their own.
    let is_relation = config.is_relation_type(type_name);

    let candidate_types: Vec<String> = config
        .entity_types()
        .into_iter()
        .chain(config.event_types())
        .filter(|t| t != ENTITY_NESTING_TYPE)
        .collect();

    let mut seen = BTreeSet::new();
    let mut arcs = Vec::new();
    let arc_types = config
        .relation_types_from(type_name)
        .into_iter()
        .chain(node.arg_roles().map(str::to_string));

    for arc in arc_types {
        if !seen.insert(arc.clone()) {
            continue;
        }

        let targets = if is_relation {
            Vec::new()
        } else {
            candidate_types
                .iter()
                .filter(|target| config.arc_types_from_to(type_name, target).contains(&arc))
                .cloned()
                .collect()
        };

        arcs.push(ArcItem {
            labels: config.labels_by_type(&arc).unwrap_or_else(|| vec![arc.clone()]),
            hotkey: hotkeys.get(&arc).cloned(),
            style: select_style(
                resolve_drawing(config, &arc, VISUAL_ARC_DEFAULT),
                ARC_DRAWING_ATTRIBUTES.iter().copied(),
            ),
            targets,
            type_name: arc,
        });
    }
    arcs
}

// =============================================================================
// RELATION TYPES
// =============================================================================

/// Project a relation forest.
pub fn project_relation_types(
    entries: &[HierarchyEntry],
    config: &dyn ProjectConfig,
    hotkeys: &HotkeyIndex,
) -> Vec<Option<RelationTypeItem>> {
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            HierarchyEntry::Separator(_) => items.push(None),
            HierarchyEntry::Node(node) if is_nesting(node) => {}
            HierarchyEntry::Node(node) => {
                items.push(Some(project_relation_node(node, config, hotkeys)));
            }
        }
    }
    items
}

fn project_relation_node(
    node: &TypeNode,
    config: &dyn ProjectConfig,
    hotkeys: &HotkeyIndex,
) -> RelationTypeItem {
    let type_name = node.storage_form();

    let properties = node
        .special_arguments(REL_TYPE_TAG)
        .unwrap_or_default()
        .iter()
        .map(|property| (property.clone(), true))
        .collect();

    let args = node
        .args
        .iter()
        .map(|arg| RelationArg {
            role: arg.role.clone(),
            targets: arg.targets.clone(),
        })
        .collect();

    RelationTypeItem {
        header: TypeHeader::new(config, type_name, node.unused),
        attributes: config.attributes_for(type_name),
        properties,
        style: select_style(
            resolve_drawing(config, type_name, VISUAL_ARC_DEFAULT),
            ARC_DRAWING_ATTRIBUTES.iter().copied(),
        ),
        hotkey: hotkeys.get(type_name).cloned(),
        args,
        children: project_relation_types(&node.children, config, hotkeys),
    }
}

// =============================================================================
// ATTRIBUTE TYPES
// =============================================================================

/// Project an attribute forest.
///
/// Attribute hierarchies are flat on the client: separators and children are
/// not projected.
pub fn project_attribute_types(
    entries: &[HierarchyEntry],
    config: &dyn ProjectConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<AttributeTypeItem> {
    entries
        .iter()
        .filter_map(HierarchyEntry::as_node)
        .filter(|node| !is_nesting(node))
        .map(|node| project_attribute_node(node, config, diagnostics))
        .collect()
}

fn attribute_style_keys() -> impl Iterator<Item = &'static str> {
    ATTR_DRAWING_ATTRIBUTES
        .iter()
        .copied()
        .chain(std::iter::once(GLYPH_POS_KEY))
}

fn project_attribute_node(
    node: &TypeNode,
    config: &dyn ProjectConfig,
    diagnostics: &mut Diagnostics,
) -> AttributeTypeItem {
    let type_name = node.storage_form();
    let drawing = resolve_drawing(config, type_name, VISUAL_ATTR_DEFAULT);
    let enumerated = node.argument_targets(VALUE_ROLE).unwrap_or_default();

    let mut values = if enumerated.is_empty() {
        vec![(
            type_name.to_string(),
            binary_value_style(type_name, drawing, diagnostics),
        )]
    } else {
        enumerated
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let mut style = enumerated_value_style(
                    type_name,
                    value,
                    index,
                    enumerated.len(),
                    drawing,
                    diagnostics,
                );
                if !ATTR_DRAWING_ATTRIBUTES.iter().any(|k| style.contains_key(*k)) {
                    style.insert(GLYPH_KEY.to_string(), format!("[{}]", value));
                }
                (value.clone(), style)
            })
            .collect()
    };

    for (value, style) in &mut values {
        apply_glyph_position(type_name, value, style, diagnostics);
    }

    AttributeTypeItem {
        header: TypeHeader::new(config, type_name, node.unused),
        values: ValueStyles(values),
    }
}

/// Style of a binary attribute, keyed under the type itself.
fn binary_value_style(
    type_name: &str,
    drawing: Option<&StyleTable>,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, String> {
    let mut style = BTreeMap::new();
    let Some(drawing) = drawing else {
        return style;
    };
    for key in attribute_style_keys() {
        match drawing.get(key) {
            Some(StyleValue::Scalar(value)) => {
                style.insert(key.to_string(), value.clone());
            }
            Some(StyleValue::List(list)) => {
                diagnostics.configuration_defect(format!(
                    "Visual config error: expected single value for {} binary attribute \
                     '{}' config, found {}. Visuals may be wrong.",
                    type_name,
                    key,
                    list.len()
                ));
                if let Some(first) = list.first() {
                    style.insert(key.to_string(), first.clone());
                }
            }
            None => {}
        }
    }
    style
}

/// Style of one enumerated value, matching list entries by position.
fn enumerated_value_style(
    type_name: &str,
    value: &str,
    index: usize,
    value_count: usize,
    drawing: Option<&StyleTable>,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, String> {
    let mut style = BTreeMap::new();
    let Some(drawing) = drawing else {
        return style;
    };
    for key in attribute_style_keys() {
        match drawing.get(key) {
            Some(StyleValue::Scalar(scalar)) => {
                style.insert(key.to_string(), scalar.clone());
            }
            Some(StyleValue::List(list)) => match list.get(index) {
                Some(entry) => {
                    style.insert(key.to_string(), entry.clone());
                }
                None => diagnostics.configuration_defect(format!(
                    "Visual config error: expected {} values for {} attribute '{}' config, \
                     found only {}. Visuals may be wrong.",
                    value_count,
                    value,
                    key,
                    list.len()
                )),
            },
            None => {}
        }
    }
    tracing::trace!(attribute = type_name, value, "Resolved attribute value style");
    style
}

/// Rename the glyph position key to `position`, dropping invalid values.
fn apply_glyph_position(
    type_name: &str,
    value: &str,
    style: &mut BTreeMap<String, String>,
    diagnostics: &mut Diagnostics,
) {
    let Some(position) = style.remove(GLYPH_POS_KEY) else {
        return;
    };
    if GLYPH_POSITIONS.contains(&position.as_str()) {
        style.insert(POSITION_KEY.to_string(), position);
    } else {
        diagnostics.configuration_defect(format!(
            "Configuration error: \"{}\" is not a valid glyph position for {} {}",
            position, type_name, value
        ));
    }
}

// =============================================================================
// UNCONFIGURED TYPES
// =============================================================================

/// Label and drawing keys with no annotation configuration, deduplicated.
///
/// Drawing defaults (`SPAN_DEFAULT`, ...) are included on purpose so the
/// client can apply them.
#[must_use]
pub fn unconfigured_types(config: &dyn ProjectConfig) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for type_name in config.label_types().into_iter().chain(config.drawing_types()) {
        if !config.is_configured_type(&type_name) && !types.contains(&type_name) {
            types.push(type_name);
        }
    }
    types
}

/// Visual-only items: every span and arc style key found, `unused = true`.
pub fn project_visual_types(types: &[String], config: &dyn ProjectConfig) -> Vec<VisualTypeItem> {
    types
        .iter()
        .map(|type_name| VisualTypeItem {
            header: TypeHeader::new(config, type_name, true),
            style: select_style(
                resolve_drawing(config, type_name, VISUAL_SPAN_DEFAULT),
                SPAN_DRAWING_ATTRIBUTES
                    .iter()
                    .chain(ARC_DRAWING_ATTRIBUTES)
                    .copied(),
            ),
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfiguration;
    use crate::diagnostics::DiagnosticKind;
    use serde_json::json;
    use std::path::Path;

    fn config(source: &str) -> ProjectConfiguration {
        ProjectConfiguration::from_toml_str(source, Path::new("test.toml")).expect("parse")
    }

    const BIO: &str = r##"
[[entities]]
type = "Protein"

[[entities]]
separator = true

[[entities]]
type = "Entity"

[[entities.children]]
type = "ENTITY-NESTING"

[[events]]
type = "Binding"
args = [
    { role = "Theme", targets = ["Protein"] },
    { role = "Theme", targets = ["Entity"] },
    { role = "Site", targets = ["Entity"] },
]

[[relations]]
type = "Equiv"
args = [
    { role = "Arg1", targets = ["Protein"] },
    { role = "Arg2", targets = ["Protein"] },
]
special = { "<REL-TYPE>" = ["symmetric", "transitive"] }

[[relations]]
type = "Site"
args = [
    { role = "Arg1", targets = ["Protein"] },
    { role = "Arg2", targets = ["Entity"] },
]

[labels]
Theme = ["Theme", "Th"]

[drawing.SPAN_DEFAULT]
fgColor = "black"
bgColor = "lightgreen"
color = "ignored-for-spans"

[drawing.Protein]
bgColor = "#7fa2ff"

[drawing.ARC_DEFAULT]
color = "black"

[drawing.Loose]
bgColor = "red"
arrowHead = "triangle,5"

[hotkeys]
P = "Protein"
T = "Theme"
"##;

    fn span_item(items: &[Option<SpanTypeItem>], type_name: &str) -> SpanTypeItem {
        items
            .iter()
            .flatten()
            .find(|i| i.header.type_name == type_name)
            .cloned()
            .expect("item present")
    }

    #[test]
    fn span_style_uses_type_then_default() {
        let config = config(BIO);
        let catalog = TypeCatalog::build(&config, &mut Diagnostics::new());

        let protein = span_item(&catalog.entity_types, "Protein");
        assert_eq!(
            protein.style.get("bgColor"),
            Some(&StyleValue::Scalar("#7fa2ff".into()))
        );
        assert!(protein.style.get("fgColor").is_none());
        assert_eq!(protein.hotkey.as_deref(), Some("P"));

        let entity = span_item(&catalog.entity_types, "Entity");
        assert_eq!(
            entity.style.get("fgColor"),
            Some(&StyleValue::Scalar("black".into()))
        );
        assert!(entity.style.get("color").is_none());
        assert!(entity.hotkey.is_none());
    }

    #[test]
    fn separators_stay_in_place_and_nesting_is_dropped() {
        let config = config(BIO);
        let catalog = TypeCatalog::build(&config, &mut Diagnostics::new());

        assert_eq!(catalog.entity_types.len(), 3);
        assert!(catalog.entity_types[1].is_none());
        let entity = span_item(&catalog.entity_types, "Entity");
        assert!(entity.children.is_empty());
    }

    #[test]
    fn arcs_dedup_relations_before_roles() {
        let config = config(BIO);
        let hotkeys = hotkeys_by_type(config.key_bindings());

        let protein = project_span_types(config.entity_hierarchy(), &config, &hotkeys);
        let protein = span_item(&protein, "Protein");
        let arc_names: Vec<_> = protein.arcs.iter().map(|a| a.type_name.as_str()).collect();
        assert_eq!(arc_names, vec!["Equiv", "Site"]);
        assert_eq!(protein.arcs[0].targets, vec!["Protein"]);
        assert_eq!(protein.arcs[1].targets, vec!["Entity"]);

        let binding = project_span_types(config.event_hierarchy(), &config, &hotkeys);
        let binding = span_item(&binding, "Binding");
        let arc_names: Vec<_> = binding.arcs.iter().map(|a| a.type_name.as_str()).collect();
        assert_eq!(arc_names, vec!["Theme", "Site"]);

        let theme = &binding.arcs[0];
        assert_eq!(theme.labels, vec!["Theme", "Th"]);
        assert_eq!(theme.hotkey.as_deref(), Some("T"));
        assert_eq!(theme.targets, vec!["Protein", "Entity"]);
        assert_eq!(theme.style.get("color"), Some(&StyleValue::Scalar("black".into())));
        assert_eq!(binding.arcs[1].labels, vec!["Site"]);
    }

    #[test]
    fn arcs_key_is_omitted_when_empty() {
        let config = config(BIO);
        let catalog = TypeCatalog::build(&config, &mut Diagnostics::new());
        let entity = span_item(&catalog.entity_types, "Entity");
        let value = serde_json::to_value(&entity).expect("serialize");
        assert!(value.get("arcs").is_none());
        assert_eq!(value["type"], json!("Entity"));
        assert_eq!(value["fgColor"], json!("black"));
    }

    #[test]
    fn relation_items_carry_properties_and_raw_args() {
        let config = config(BIO);
        let catalog = TypeCatalog::build(&config, &mut Diagnostics::new());
        let equiv = catalog.relation_types[0].clone().expect("relation");

        assert_eq!(equiv.properties.get("symmetric"), Some(&true));
        assert_eq!(equiv.properties.get("transitive"), Some(&true));
        assert_eq!(equiv.args.len(), 2);
        assert_eq!(equiv.args[0].role, "Arg1");
        assert_eq!(equiv.args[0].targets, vec!["Protein"]);
        assert_eq!(equiv.style.get("color"), Some(&StyleValue::Scalar("black".into())));

        let value = serde_json::to_value(&equiv).expect("serialize");
        assert_eq!(value["args"][1], json!({"role": "Arg2", "targets": ["Protein"]}));
    }

    #[test]
    fn relation_targets_are_empty_for_relation_typed_spans() {
        // A type configured both as span and relation keeps its arcs target-free.
        let config = config(
            r#"
[[entities]]
type = "Link"
args = [{ role = "Arg", targets = ["Link"] }]

[[relations]]
type = "Link"
args = [
    { role = "Arg1", targets = ["Link"] },
    { role = "Arg2", targets = ["Link"] },
]
"#,
        );
        let hotkeys = HotkeyIndex::new();
        let items = project_span_types(config.entity_hierarchy(), &config, &hotkeys);
        let link = span_item(&items, "Link");
        assert_eq!(link.arcs.len(), 2);
        assert!(link.arcs.iter().all(|a| a.targets.is_empty()));
    }

    const ATTRS: &str = r#"
[[entity_attributes]]
type = "Confidence"
args = [{ role = "Value", targets = ["L1", "L2", "L3"] }]

[[entity_attributes]]
separator = true

[[entity_attributes]]
type = "Negation"

[[entity_attributes]]
type = "Speculation"

[[entity_attributes]]
type = "Side"
args = [{ role = "Value", targets = ["Left", "Middle", "Right"] }]

[drawing.Confidence]
glyph = ["*", "**"]
glyphColor = "red"

[drawing.Negation]
box = ["crossed", "none"]
"<GLYPH-POS>" = "left"

[drawing.Side]
glyph = "|"
"<GLYPH-POS>" = ["left", "center", "right"]
"#;

    fn attribute_items(source: &str, diagnostics: &mut Diagnostics) -> Vec<AttributeTypeItem> {
        let config = config(source);
        project_attribute_types(config.entity_attribute_hierarchy(), &config, diagnostics)
    }

    fn style_entry<'a>(item: &'a AttributeTypeItem, value: &str, key: &str) -> Option<&'a str> {
        item.values
            .get(value)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    #[test]
    fn short_style_list_degrades_with_diagnostic() {
        let mut diagnostics = Diagnostics::new();
        let items = attribute_items(ATTRS, &mut diagnostics);

        assert_eq!(items.len(), 4);
        let confidence = &items[0];
        assert_eq!(style_entry(confidence, "L1", "glyph"), Some("*"));
        assert_eq!(style_entry(confidence, "L2", "glyph"), Some("**"));
        let l3 = confidence.values.get("L3").expect("L3");
        assert!(l3.get("glyph").is_none());
        assert_eq!(l3.get("glyphColor").map(String::as_str), Some("red"));
        assert!(diagnostics.count(DiagnosticKind::ConfigurationDefect) >= 1);
        assert!(diagnostics.entries().iter().any(|d| d
            .message
            .contains("expected 3 values for L3 attribute 'glyph' config, found only 2")));
    }

    #[test]
    fn binary_attribute_takes_first_list_entry_and_position() {
        let mut diagnostics = Diagnostics::new();
        let items = attribute_items(ATTRS, &mut diagnostics);

        let negation = &items[1];
        assert_eq!(negation.values.len(), 1);
        let style = negation.values.get("Negation").expect("binary value");
        assert_eq!(style.get("box").map(String::as_str), Some("crossed"));
        assert_eq!(style.get("position").map(String::as_str), Some("left"));
        assert!(style.get(GLYPH_POS_KEY).is_none());
        assert!(diagnostics
            .entries()
            .iter()
            .any(|d| d.message.contains("binary attribute 'box'")));
    }

    #[test]
    fn binary_attribute_without_style_stays_empty() {
        let items = attribute_items(ATTRS, &mut Diagnostics::new());
        let speculation = &items[2];
        assert_eq!(speculation.values.len(), 1);
        let style = speculation.values.get("Speculation").expect("value");
        assert!(style.is_empty());
    }

    #[test]
    fn enumerated_value_without_style_gets_bracketed_glyph() {
        let source = r#"
[[entity_attributes]]
type = "Level"
args = [{ role = "Value", targets = ["Low"] }, { role = "Value", targets = ["High", "Low"] }]
"#;
        let mut diagnostics = Diagnostics::new();
        let items = attribute_items(source, &mut diagnostics);

        let level = &items[0];
        assert_eq!(level.values.len(), 2);
        assert_eq!(style_entry(level, "Low", "glyph"), Some("[Low]"));
        assert_eq!(style_entry(level, "High", "glyph"), Some("[High]"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn invalid_position_is_dropped() {
        let mut diagnostics = Diagnostics::new();
        let items = attribute_items(ATTRS, &mut diagnostics);
        let side = &items[3];

        assert_eq!(style_entry(side, "Left", "position"), Some("left"));
        let middle = side.values.get("Middle").expect("middle");
        assert!(middle.get("position").is_none());
        assert!(middle.get(GLYPH_POS_KEY).is_none());
        assert_eq!(middle.get("glyph").map(String::as_str), Some("|"));
        assert_eq!(style_entry(side, "Right", "position"), Some("right"));
        assert!(diagnostics
            .entries()
            .iter()
            .any(|d| d.message.contains("\"center\" is not a valid glyph position")));
    }

    #[test]
    fn values_serialize_in_declared_order() {
        let items = attribute_items(ATTRS, &mut Diagnostics::new());
        let json = serde_json::to_string(&items[0].values).expect("serialize");
        let l1 = json.find("\"L1\"").expect("L1");
        let l2 = json.find("\"L2\"").expect("L2");
        let l3 = json.find("\"L3\"").expect("L3");
        assert!(l1 < l2 && l2 < l3);
    }

    #[test]
    fn repeated_relation_role_projects_once() {
        let config = config(
            r#"
[[entities]]
type = "Protein"

[[entities]]
type = "Gene"

[[relations]]
type = "Encodes"
args = [
    { role = "Arg1", targets = ["Protein"] },
    { role = "Arg1", targets = ["Gene"] },
    { role = "Arg2", targets = ["Protein"] },
]
"#,
        );
        let catalog = TypeCatalog::build(&config, &mut Diagnostics::new());
        let encodes = catalog.relation_types[0].clone().expect("relation");
        assert_eq!(encodes.args.len(), 2);
        assert_eq!(encodes.args[0].role, "Arg1");
        assert_eq!(encodes.args[0].targets, vec!["Protein", "Gene"]);

        let gene = span_item(&catalog.entity_types, "Gene");
        let arc_names: Vec<_> = gene.arcs.iter().map(|a| a.type_name.as_str()).collect();
        assert_eq!(arc_names, vec!["Encodes"]);
    }

    #[test]
    fn unconfigured_types_include_defaults_once() {
        let config = config(BIO);
        let types = unconfigured_types(&config);
        assert_eq!(types, vec!["Theme", "ARC_DEFAULT", "Loose", "SPAN_DEFAULT"]);

        let items = project_visual_types(&types, &config);
        let loose = items.iter().find(|i| i.header.type_name == "Loose").expect("loose");
        assert!(loose.header.unused);
        assert_eq!(loose.style.get("bgColor"), Some(&StyleValue::Scalar("red".into())));
        assert_eq!(
            loose.style.get("arrowHead"),
            Some(&StyleValue::Scalar("triangle,5".into()))
        );

        let theme = items.iter().find(|i| i.header.type_name == "Theme").expect("theme");
        assert_eq!(
            theme.header.labels,
            Some(vec!["Theme".to_string(), "Th".to_string()])
        );
        assert_eq!(
            theme.style.get("bgColor"),
            Some(&StyleValue::Scalar("lightgreen".into()))
        );
    }

    #[test]
    fn hotkey_index_inverts_bindings() {
        let mut bindings = BTreeMap::new();
        bindings.insert("P".to_string(), "Protein".to_string());
        bindings.insert("X".to_string(), "Protein".to_string());
        bindings.insert("E".to_string(), "Entity".to_string());
        let index = hotkeys_by_type(&bindings);
        assert_eq!(index.get("Protein").map(String::as_str), Some("X"));
        assert_eq!(index.get("Entity").map(String::as_str), Some("E"));
    }
}
