//! # Document Projector
//!
//! Builds the client document model for one document: text, sentence and
//! token offsets, annotations as wire rows, comments and file metadata.
//!
//! ## Pipeline
//!
//! ```text
//! path -> directory check -> read text -> NBSP transform -> boundaries
//!      -> open store -> merge sentences over textbounds -> classify
//!      -> rows + comments -> verification -> metadata
//! ```
//!
//! Directory and text failures abort the projection. Unparsable lines and
//! verification problems end up as comments and diagnostics.

use crate::boundary::Locale;
use crate::config::ProjectConfiguration;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::primitives::{ANNOTATION_ERROR, DOUBLE_SPACE, SPACE_NBSP, TEXT_FILE_SUFFIX};
use crate::store::{AnnotationStore, StandoffStore, with_suffix};
use crate::types::{
    AnnotationSet, AttributeRow, CommentRow, CommentTarget, EquivRow, EventRow, FailedLine,
    RelationRow, Span, SpanviewError, TextboundRow,
};
use crate::verify::{Issue, SchemaVerifier, Verifier};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Per-call projection settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Boundary strategy for sentences and tokens.
    pub locale: Locale,
    /// Run the verifier and attach its issues as comments.
    pub verify: bool,
}

/// The client document model. Field names and order are the wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentProjection {
    pub text: String,
    pub sentence_offsets: Vec<Span>,
    pub token_offsets: Vec<Span>,
    pub entities: Vec<TextboundRow>,
    pub events: Vec<EventRow>,
    pub relations: Vec<RelationRow>,
    pub triggers: Vec<TextboundRow>,
    pub attributes: Vec<AttributeRow>,
    pub equivs: Vec<EquivRow>,
    pub comments: Vec<CommentRow>,
    pub modifications: Vec<serde_json::Value>,
    pub offset: usize,
    pub mtime: f64,
    pub ctime: f64,
    pub source_files: Vec<String>,
}

/// Replace every second space of a double space with U+00A0.
///
/// Applied once, left to right, to the copy sent to the client only.
#[must_use]
pub fn client_text(text: &str) -> String {
    text.replace(DOUBLE_SPACE, SPACE_NBSP)
}

/// Merge adjacent sentences that a textbound straddles.
///
/// For each textbound the cursor restarts at the first sentence. A sentence
/// whose end lies strictly inside the textbound is joined with its successor
/// and re-tested. Only adjacent pairs are merged; a straddle on the last
/// sentence leaves the list unchanged.
pub fn merge_sentence_boundaries(
    sentences: &mut Vec<Span>,
    textbounds: impl IntoIterator<Item = Span>,
) {
    for tb in textbounds {
        let mut i = 0;
        while i < sentences.len() {
            let current = sentences[i];
            if !tb.straddles(current.end()) {
                i += 1;
                continue;
            }
            let Some(&next) = sentences.get(i + 1) else {
                break;
            };
            sentences[i] = Span(current.start(), next.end());
            sentences.remove(i + 1);
        }
    }
}

/// Sorted, deduplicated suffixes of the files read, plus the text suffix.
fn source_files(annotations: &AnnotationSet) -> Vec<String> {
    let mut suffixes: BTreeSet<String> = annotations
        .input_files
        .iter()
        .filter_map(|p| p.extension().and_then(|e| e.to_str()))
        .map(str::to_string)
        .collect();
    suffixes.insert(TEXT_FILE_SUFFIX.to_string());
    suffixes.into_iter().collect()
}

/// One comment summarising every unparsable line, one-indexed.
fn failed_lines_comment(failed: &[FailedLine]) -> CommentRow {
    let lines: Vec<String> = failed
        .iter()
        .map(|f| format!("{}: {}", f.line + 1, f.text).trim().to_string())
        .collect();
    CommentRow(
        CommentTarget::Sentence(0),
        ANNOTATION_ERROR.to_string(),
        format!("Unable to parse the following line(s):\n{}", lines.join("\n")),
    )
}

fn issue_comment(issue: Issue) -> CommentRow {
    CommentRow(
        CommentTarget::Annotation(issue.ann_id),
        issue.kind.comment_type().to_string(),
        issue.description,
    )
}

/// Document projector with its store and verifier collaborators.
pub struct DocumentProjector {
    store: Box<dyn AnnotationStore>,
    verifier: Box<dyn Verifier>,
    options: ProjectionOptions,
}

impl DocumentProjector {
    /// Projector over on-disk standoff files with schema verification.
    #[must_use]
    pub fn new(options: ProjectionOptions) -> Self {
        Self {
            store: Box::new(StandoffStore::new()),
            verifier: Box::new(SchemaVerifier::new()),
            options,
        }
    }

    #[must_use]
    pub fn with_store(mut self, store: Box<dyn AnnotationStore>) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_verifier(mut self, verifier: Box<dyn Verifier>) -> Self {
        self.verifier = verifier;
        self
    }

    #[must_use]
    pub fn options(&self) -> ProjectionOptions {
        self.options
    }

    /// Project `document` (path without suffix) below the data `root`.
    ///
    /// # Errors
    ///
    /// `DirectoryNotDocument` if the path is a directory, `TextUnreadable`
    /// if the text file cannot be read as UTF-8, or any error the
    /// annotation store returns.
    pub fn project(
        &self,
        document: &Path,
        root: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<DocumentProjection, SpanviewError> {
        if document.is_dir() {
            return Err(SpanviewError::DirectoryNotDocument {
                path: document.to_path_buf(),
            });
        }

        let text_path = with_suffix(document, TEXT_FILE_SUFFIX);
        let raw = std::fs::read_to_string(&text_path).map_err(|e| {
            SpanviewError::TextUnreadable {
                path: text_path.clone(),
                reason: e.to_string(),
            }
        })?;
        let text = client_text(&raw);

        let detector = self.options.locale.detector();
        let mut sentence_offsets: Vec<Span> = detector.sentences(&text).collect();
        let token_offsets: Vec<Span> = detector.tokens(&text).collect();

        let annotations = self.store.open(document)?;

        merge_sentence_boundaries(
            &mut sentence_offsets,
            annotations.textbounds.iter().map(|tb| tb.span()),
        );

        let trigger_ids: HashSet<&str> = annotations
            .events
            .iter()
            .map(|e| e.trigger.as_str())
            .collect();
        let (triggers, entities): (Vec<_>, Vec<_>) = annotations
            .textbounds
            .iter()
            .partition(|tb| trigger_ids.contains(tb.id.as_str()));

        let mut comments: Vec<CommentRow> = annotations
            .notes
            .iter()
            .map(|note| {
                CommentRow(
                    CommentTarget::Annotation(note.target.clone()),
                    note.type_name.clone(),
                    note.tail.trim().to_string(),
                )
            })
            .collect();

        if !annotations.failed_lines.is_empty() {
            let comment = failed_lines_comment(&annotations.failed_lines);
            diagnostics.report(DiagnosticKind::AnnotationParse, comment.2.clone());
            comments.push(comment);
        }

        if self.options.verify {
            comments.extend(
                self.verification_issues(document, root, &annotations, diagnostics)
                    .into_iter()
                    .map(issue_comment),
            );
        }

        tracing::debug!(
            document = %document.display(),
            sentences = sentence_offsets.len(),
            tokens = token_offsets.len(),
            entities = entities.len(),
            triggers = triggers.len(),
            "Projected document"
        );

        Ok(DocumentProjection {
            text,
            sentence_offsets,
            token_offsets,
            entities: entities.into_iter().map(TextboundRow::from).collect(),
            events: annotations.events.iter().map(EventRow::from).collect(),
            relations: annotations.relations.iter().map(RelationRow::from).collect(),
            triggers: triggers.into_iter().map(TextboundRow::from).collect(),
            attributes: annotations.attributes.iter().map(AttributeRow::from).collect(),
            equivs: annotations.equivs.iter().map(EquivRow::from).collect(),
            comments,
            modifications: Vec::new(),
            offset: 0,
            mtime: annotations.mtime,
            ctime: annotations.ctime,
            source_files: source_files(&annotations),
        })
    }

    /// Issues from the verifier; any failure counts as zero issues.
    fn verification_issues(
        &self,
        document: &Path,
        root: &Path,
        annotations: &AnnotationSet,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Issue> {
        let directory = document.parent().unwrap_or(root);
        let outcome = ProjectConfiguration::for_directory(directory, root)
            .and_then(|config| self.verifier.verify(annotations, &config));
        match outcome {
            Ok(issues) => issues,
            Err(e) => {
                diagnostics.report(
                    DiagnosticKind::VerificationFailure,
                    format!("Error: verification failed: {e}"),
                );
                Vec::new()
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
