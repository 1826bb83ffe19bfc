//! # Diagnostics
//!
//! Non-fatal diagnostic channel shared by the projectors.
//!
//! Configuration defects, unparsable annotation lines and verification
//! failures never abort a projection. They are recorded here, logged at
//! `warn`, and handed back to the caller alongside the result.

use serde::Serialize;

/// Category of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Malformed drawing config (list cardinality, invalid position value).
    ConfigurationDefect,
    /// One or more annotation lines could not be parsed.
    AnnotationParse,
    /// The verification engine failed and was skipped.
    VerificationFailure,
}

impl DiagnosticKind {
    /// Severity label used by the client message area.
    #[must_use]
    pub const fn severity(self) -> &'static str {
        match self {
            Self::ConfigurationDefect => "warning",
            Self::AnnotationParse | Self::VerificationFailure => "error",
        }
    }
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Ordered collection of diagnostics for one request.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = ?kind, "{}", message);
        self.entries.push(Diagnostic { kind, message });
    }

    /// Shorthand for [`DiagnosticKind::ConfigurationDefect`].
    pub fn configuration_defect(&mut self, message: impl Into<String>) {
        self.report(DiagnosticKind::ConfigurationDefect, message);
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count the diagnostics of one kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
