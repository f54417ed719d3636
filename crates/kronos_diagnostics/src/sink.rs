//! Shared collection point for diagnostics from every analysis stage.

use crate::code::Category;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::Mutex;

/// Collects diagnostics across the whole run, in emission order.
///
/// One sink is threaded through the front-ends, the enumerator, and the
/// parallel delay workers; everything it gathers ends up rendered into the
/// run log. Diagnostic volume in an STA run is small (a handful of skipped
/// arcs and unrecognized constraint commands), so the sink favors a plain
/// mutex-guarded vector and derives its counts on demand instead of
/// maintaining counters alongside it.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

/// Per-severity totals, for the run-log summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    /// Number of error diagnostics.
    pub errors: usize,
    /// Number of warning diagnostics.
    pub warnings: usize,
    /// Number of note diagnostics.
    pub notes: usize,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Appends a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        self.diagnostics.lock().unwrap().push(diag);
    }

    /// Returns `true` if any error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.severity_counts().errors
    }

    /// Totals per severity, for the run-log summary line.
    pub fn severity_counts(&self) -> SeverityCounts {
        let diagnostics = self.diagnostics.lock().unwrap();
        let mut counts = SeverityCounts::default();
        for diag in diagnostics.iter() {
            match diag.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Note => counts.notes += 1,
            }
        }
        counts
    }

    /// Number of diagnostics from the given front-end or engine category.
    pub fn count_in(&self, category: Category) -> usize {
        self.diagnostics
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.code.category == category)
            .count()
    }

    /// Drains the sink, returning everything emitted so far in order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock().unwrap())
    }

    /// Snapshots the accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().unwrap().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
