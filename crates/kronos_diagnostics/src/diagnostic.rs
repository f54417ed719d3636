//! Structured diagnostic messages with severity, codes, and locations.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in an input file, used to locate front-end diagnostics.
///
/// The STA front-ends are line-oriented, so a file name and 1-based line
/// number are sufficient to point at the offending input.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Location {
    /// The input file the diagnostic refers to.
    pub file: String,
    /// 1-based line number within the file.
    pub line: u32,
}

impl Location {
    /// Creates a new location.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A structured diagnostic message.
///
/// Diagnostics are the mechanism for reporting recoverable problems and
/// context to the user: unrecognized constraint commands, skipped paths,
/// suspicious library content. Each diagnostic has a severity, a unique
/// code, a message, an optional input location, and optional footnotes.
/// Unrecoverable failures propagate as `StaError` values instead and never
/// pass through here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// Where in the input the issue was detected, if known.
    pub location: Option<Location>,
    /// Explanatory footnotes (rendered as "note: ...").
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code and message.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with the given code and message.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new note diagnostic with the given code and message.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            code,
            message: message.into(),
            location: None,
            notes: Vec::new(),
        }
    }

    /// Attaches an input location to this diagnostic.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Adds a footnote to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn error_constructor() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 1), "bad input");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "bad input");
        assert!(diag.location.is_none());
        assert!(diag.notes.is_empty());
    }

    #[test]
    fn warning_with_location() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Sdc, 1),
            "unrecognized SDC command",
        )
        .with_location(Location::new("constraints.sdc", 14));
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.location.as_ref().unwrap().line, 14);
    }

    #[test]
    fn note_accumulation() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Timing, 9), "skipping path")
            .with_note("no receiver pin on first edge");
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn location_display() {
        let loc = Location::new("design.v", 42);
        assert_eq!(format!("{loc}"), "design.v:42");
    }

    #[test]
    fn serde_roundtrip() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Netlist, 7), "odd binding")
            .with_location(Location::new("top.v", 3));
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, "odd binding");
        assert_eq!(back.location, diag.location);
    }
}
