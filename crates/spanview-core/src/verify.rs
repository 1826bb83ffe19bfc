//! # Verification
//!
//! Checks an annotation set against the project configuration and reports
//! issues. Issues are data: they end up as comments on the projected
//! document. A verifier that fails outright is skipped by the caller.

use crate::config::ProjectConfig;
use crate::primitives::{ANNOTATION_ERROR, ANNOTATION_WARNING};
use crate::types::{AnnotationSet, SpanviewError};

/// Severity of a verification issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Error,
    Warning,
}

impl IssueKind {
    /// Comment type shown by the client.
    #[must_use]
    pub const fn comment_type(self) -> &'static str {
        match self {
            Self::Error => ANNOTATION_ERROR,
            Self::Warning => ANNOTATION_WARNING,
        }
    }
}

/// One problem found on one annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub ann_id: String,
    pub kind: IssueKind,
    pub description: String,
}

impl Issue {
    fn error(ann_id: &str, description: String) -> Self {
        Self {
            ann_id: ann_id.to_string(),
            kind: IssueKind::Error,
            description,
        }
    }

    fn warning(ann_id: &str, description: String) -> Self {
        Self {
            ann_id: ann_id.to_string(),
            kind: IssueKind::Warning,
            description,
        }
    }
}

/// Verification engine.
pub trait Verifier: Send + Sync {
    fn verify(
        &self,
        annotations: &AnnotationSet,
        config: &dyn ProjectConfig,
    ) -> Result<Vec<Issue>, SpanviewError>;
}

/// Strips the numeric suffix of repeated roles (`Theme2` -> `Theme`).
fn base_role(role: &str) -> &str {
    let trimmed = role.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() { role } else { trimmed }
}

/// Structural checks against the type hierarchy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaVerifier;

impl SchemaVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_textbounds(set: &AnnotationSet, config: &dyn ProjectConfig, issues: &mut Vec<Issue>) {
        for tb in &set.textbounds {
            if !config.is_configured_type(&tb.type_name) {
                issues.push(Issue::error(
                    &tb.id,
                    format!("Unknown type '{}'", tb.type_name),
                ));
            }
        }
    }

    fn check_events(set: &AnnotationSet, config: &dyn ProjectConfig, issues: &mut Vec<Issue>) {
        for event in &set.events {
            if !set.textbounds.iter().any(|t| t.id == event.trigger) {
                issues.push(Issue::error(
                    &event.id,
                    format!("Trigger '{}' does not exist", event.trigger),
                ));
            }
            for arg in &event.args {
                let Some(arg_type) = set.type_of(&arg.id) else {
                    issues.push(Issue::error(
                        &event.id,
                        format!("Argument {} refers to unknown annotation '{}'", arg.role, arg.id),
                    ));
                    continue;
                };
                let role = base_role(&arg.role);
                let allowed = config.arc_types_from_to(&event.type_name, arg_type);
                if !allowed.iter().any(|a| a == role) {
                    issues.push(Issue::warning(
                        &event.id,
                        format!(
                            "{} is not a valid argument role from {} to {}",
                            arg.role, event.type_name, arg_type
                        ),
                    ));
                }
            }
        }
    }

    fn check_relations(set: &AnnotationSet, config: &dyn ProjectConfig, issues: &mut Vec<Issue>) {
        for rel in &set.relations {
            let from = set.type_of(&rel.arg1.id);
            let to = set.type_of(&rel.arg2.id);
            match (from, to) {
                (Some(from), Some(to)) => {
                    if !config
                        .arc_types_from_to(from, to)
                        .iter()
                        .any(|a| *a == rel.type_name)
                    {
                        issues.push(Issue::error(
                            &rel.id,
                            format!(
                                "{} relation not allowed from {} to {}",
                                rel.type_name, from, to
                            ),
                        ));
                    }
                }
                _ => {
                    for arg in [&rel.arg1, &rel.arg2] {
                        if set.type_of(&arg.id).is_none() {
                            issues.push(Issue::error(
                                &rel.id,
                                format!("{} refers to unknown annotation '{}'", arg.role, arg.id),
                            ));
                        }
                    }
                }
            }
        }
    }

    fn check_attributes(set: &AnnotationSet, config: &dyn ProjectConfig, issues: &mut Vec<Issue>) {
        for attr in &set.attributes {
            match set.type_of(&attr.target) {
                None => issues.push(Issue::error(
                    &attr.id,
                    format!("Attribute target '{}' does not exist", attr.target),
                )),
                Some(target_type) => {
                    if !config
                        .attributes_for(target_type)
                        .iter()
                        .any(|a| *a == attr.type_name)
                    {
                        issues.push(Issue::error(
                            &attr.id,
                            format!("{} is not applicable to {}", attr.type_name, target_type),
                        ));
                    }
                }
            }
        }
    }

    fn check_equivs(set: &AnnotationSet, issues: &mut Vec<Issue>) {
        for eq in &set.equivs {
            for member in &eq.members {
                if !set.contains_id(member) {
                    issues.push(Issue::error(
                        member,
                        format!("{} refers to unknown annotation", eq.type_name),
                    ));
                }
            }
        }
    }
}

impl Verifier for SchemaVerifier {
    fn verify(
        &self,
        annotations: &AnnotationSet,
        config: &dyn ProjectConfig,
    ) -> Result<Vec<Issue>, SpanviewError> {
        let mut issues = Vec::new();
        Self::check_textbounds(annotations, config, &mut issues);
        Self::check_events(annotations, config, &mut issues);
        Self::check_relations(annotations, config, &mut issues);
        Self::check_attributes(annotations, config, &mut issues);
        Self::check_equivs(annotations, &mut issues);
        tracing::debug!(issues = issues.len(), "Verified annotations");
        Ok(issues)
    }
}
