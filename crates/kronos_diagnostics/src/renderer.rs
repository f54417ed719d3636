//! Plain-text diagnostic rendering for the run log.

use crate::diagnostic::Diagnostic;

/// Renders diagnostics into the line-oriented format used in run logs.
///
/// Produces output like:
/// ```text
/// warning[S001]: unrecognized SDC command: `set_driving_cell`
///   --> constraints.sdc:14
///    = note: command skipped
/// ```
pub struct LogRenderer;

impl LogRenderer {
    /// Creates a new log renderer.
    pub fn new() -> Self {
        Self
    }

    /// Renders a single diagnostic into a formatted string.
    pub fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "{}[{}]: {}\n",
            diag.severity, diag.code, diag.message
        ));

        if let Some(location) = &diag.location {
            out.push_str(&format!("  --> {location}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        out
    }

    /// Renders a batch of diagnostics in emission order.
    pub fn render_all(&self, diags: &[Diagnostic]) -> String {
        diags.iter().map(|d| self.render(d)).collect()
    }
}

impl Default for LogRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::diagnostic::Location;

    #[test]
    fn render_error_with_location() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Netlist, 101),
            "expected ')' in port connection",
        )
        .with_location(Location::new("design.v", 10));

        let output = LogRenderer::new().render(&diag);
        assert!(output.contains("error[N101]: expected ')' in port connection"));
        assert!(output.contains("--> design.v:10"));
    }

    #[test]
    fn render_warning_with_notes() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Timing, 9), "skipping path")
            .with_note("no receiver pin on first edge");

        let output = LogRenderer::new().render(&diag);
        assert!(output.contains("warning[T009]: skipping path"));
        assert!(output.contains("= note: no receiver pin on first edge"));
    }

    #[test]
    fn render_without_location() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 999), "general error");
        let output = LogRenderer::new().render(&diag);
        assert!(output.contains("error[E999]: general error"));
        assert!(!output.contains("-->"));
    }

    #[test]
    fn render_all_in_order() {
        let diags = vec![
            Diagnostic::warning(DiagnosticCode::new(Category::Sdc, 1), "first"),
            Diagnostic::warning(DiagnosticCode::new(Category::Sdc, 2), "second"),
        ];
        let output = LogRenderer::new().render_all(&diags);
        let first = output.find("first").unwrap();
        let second = output.find("second").unwrap();
        assert!(first < second);
    }
}
