//! Diagnostic aggregation and rendering.

use crate::core::error::{Diagnostic, ValidationFailure};

/// Ordered collection of diagnostics for one candidate.
///
/// Insertion order is discovery order. Collecting never fails; the caller
/// decides what to do with the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one violation.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::trace!("diagnostic: {}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Record several violations.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for d in diagnostics {
            self.push(d);
        }
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wrap the collection into a failure value.
    pub fn into_failure(self, candidate: impl Into<String>) -> ValidationFailure {
        ValidationFailure {
            candidate: candidate.into(),
            diagnostics: self.entries,
        }
    }
}

/// Render diagnostics as numbered lines with suggestions.
pub fn render(candidate: &str, diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return format!("combine candidate '{}' has no violations", candidate);
    }

    let mut out = format!(
        "combine candidate '{}' is invalid ({} violation(s)):",
        candidate,
        diagnostics.len()
    );
    for (i, diagnostic) in diagnostics.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, diagnostic));
        if let Some(fix) = diagnostic.suggested_fix() {
            out.push_str(&format!("\n     → Suggestion: {}", fix));
        }
    }
    out
}
