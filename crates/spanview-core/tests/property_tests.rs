//! # Property-Based Tests
//!
//! Structural invariants of both projections, checked with proptest.

use proptest::collection::vec;
use proptest::prelude::*;
use spanview_core::catalog::{hotkeys_by_type, project_span_types};
use spanview_core::{
    Diagnostics, HierarchyEntry, ProjectConfiguration, Span, TypeCatalog, TypeNode,
    client_text, merge_sentence_boundaries,
};
use std::collections::BTreeSet;

const NESTING: &str = "ENTITY-NESTING";

// =============================================================================
// STRATEGIES
// =============================================================================

fn type_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[A-E]".prop_map(|s| format!("Type{s}")),
        1 => Just(NESTING.to_string()),
    ]
}

fn leaf_entry() -> impl Strategy<Value = HierarchyEntry> {
    prop_oneof![
        4 => type_name().prop_map(|name| HierarchyEntry::from(TypeNode::new(name))),
        1 => Just(HierarchyEntry::separator()),
    ]
}

/// Forests up to three levels deep with separators and nesting sentinels.
fn forest() -> impl Strategy<Value = Vec<HierarchyEntry>> {
    let entry = leaf_entry().prop_recursive(3, 24, 4, |inner| {
        (type_name(), vec(inner, 0..4)).prop_map(|(name, children)| {
            HierarchyEntry::from(
                children
                    .into_iter()
                    .fold(TypeNode::new(name), TypeNode::with_child),
            )
        })
    });
    vec(entry, 0..6)
}

/// Adjacent sentences covering `[0, total)`.
fn sentences() -> impl Strategy<Value = Vec<Span>> {
    vec(1usize..20, 1..10).prop_map(|lengths| {
        let mut start = 0;
        lengths
            .into_iter()
            .map(|len| {
                let span = Span(start, start + len);
                start += len;
                span
            })
            .collect()
    })
}

fn textbounds() -> impl Strategy<Value = Vec<Span>> {
    vec((0usize..200, 0usize..40), 0..8)
        .prop_map(|pairs| pairs.into_iter().map(|(s, len)| Span(s, s + len)).collect())
}

// =============================================================================
// TYPE CATALOG PROPERTIES
// =============================================================================

proptest! {
    /// The nesting sentinel never appears in the projected catalog.
    #[test]
    fn nesting_sentinel_never_projected(entities in forest(), events in forest()) {
        let config = ProjectConfiguration {
            entities,
            events,
            ..ProjectConfiguration::default()
        };
        let catalog = TypeCatalog::build(&config, &mut Diagnostics::new());
        let rendered = serde_json::to_string(&catalog).expect("serialize");
        prop_assert!(!rendered.contains(NESTING));
    }

    /// Separators keep their position among the surviving siblings.
    #[test]
    fn separators_keep_position(entities in forest()) {
        let config = ProjectConfiguration {
            entities: entities.clone(),
            ..ProjectConfiguration::default()
        };
        let projected = project_span_types(&entities, &config, &hotkeys_by_type(&config.hotkeys));

        let expected: Vec<bool> = entities
            .iter()
            .filter(|e| e.as_node().is_none_or(|n| n.storage != NESTING))
            .map(|e| e.as_node().is_none())
            .collect();
        let actual: Vec<bool> = projected.iter().map(Option::is_none).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Arc lists never repeat an arc type.
    #[test]
    fn arcs_are_unique(
        roles in vec(prop_oneof![Just("Theme"), Just("Cause"), Just("Link")], 0..6),
        relation_names in vec(prop_oneof![Just("Link"), Just("Cause"), Just("Equal")], 0..4),
    ) {
        let event = roles
            .iter()
            .fold(TypeNode::new("Binding"), |node, role| node.with_arg(*role, ["Protein"]));
        let relations: Vec<HierarchyEntry> = relation_names
            .iter()
            .map(|name| {
                TypeNode::new(*name)
                    .with_arg("Arg1", ["Binding"])
                    .with_arg("Arg2", ["Protein"])
                    .into()
            })
            .collect();
        let config = ProjectConfiguration {
            entities: vec![TypeNode::new("Protein").into()],
            events: vec![event.into()],
            relations,
            ..ProjectConfiguration::default()
        };

        let catalog = TypeCatalog::build(&config, &mut Diagnostics::new());
        let Some(Some(binding)) = catalog.event_types.first() else {
            return Err(TestCaseError::fail("missing event type"));
        };
        let mut seen = BTreeSet::new();
        for arc in &binding.arcs {
            prop_assert!(seen.insert(arc.type_name.clone()), "duplicate arc {}", arc.type_name);
        }
    }

    /// Catalog projection is deterministic.
    #[test]
    fn catalog_is_deterministic(entities in forest()) {
        let config = ProjectConfiguration {
            entities,
            ..ProjectConfiguration::default()
        };
        let first = serde_json::to_string(&TypeCatalog::build(&config, &mut Diagnostics::new()))
            .expect("serialize");
        let second = serde_json::to_string(&TypeCatalog::build(&config, &mut Diagnostics::new()))
            .expect("serialize");
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// DOCUMENT PROPERTIES
// =============================================================================

proptest! {
    /// Merged sentences stay ascending and non-overlapping, keep the outer
    /// bounds, and no textbound straddles a remaining inner boundary.
    #[test]
    fn sentence_merge_invariants(mut merged in sentences(), spans in textbounds()) {
        let original = merged.clone();
        merge_sentence_boundaries(&mut merged, spans.iter().copied());

        prop_assert!(!merged.is_empty());
        prop_assert_eq!(merged.first().map(|s| s.start()), original.first().map(|s| s.start()));
        prop_assert_eq!(merged.last().map(|s| s.end()), original.last().map(|s| s.end()));
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end() <= pair[1].start());
        }

        let inner_ends = &merged[..merged.len() - 1];
        for tb in &spans {
            for sentence in inner_ends {
                prop_assert!(!tb.straddles(sentence.end()));
            }
        }
    }

    /// Merging only removes boundaries, never invents them.
    #[test]
    fn sentence_merge_removes_only(mut merged in sentences(), spans in textbounds()) {
        let original: BTreeSet<usize> = merged.iter().map(|s| s.end()).collect();
        merge_sentence_boundaries(&mut merged, spans);
        for sentence in &merged {
            prop_assert!(original.contains(&sentence.end()));
        }
    }

    /// The client text transform keeps the char count.
    #[test]
    fn nbsp_transform_preserves_length(text in "[a b\\n]{0,40}") {
        let transformed = client_text(&text);
        prop_assert_eq!(transformed.chars().count(), text.chars().count());
        prop_assert!(!transformed.contains("  "));
    }
}
