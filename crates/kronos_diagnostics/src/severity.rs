//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Note`) to most severe (`Error`), matching the
/// derived `PartialOrd`/`Ord` implementation based on declaration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// An informational note providing additional context.
    Note,
    /// A potential issue that should be reviewed but doesn't stop the run.
    Warning,
    /// A definite problem that prevents a successful analysis.
    Error,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_order_and_error_test() {
        // Only Error stops a run; the ordering lets callers filter with a
        // threshold comparison.
        let mut severities = [Severity::Error, Severity::Note, Severity::Warning];
        severities.sort();
        assert_eq!(
            severities,
            [Severity::Note, Severity::Warning, Severity::Error]
        );
        assert!(severities.iter().filter(|s| s.is_error()).count() == 1);
    }

    #[test]
    fn log_prefixes() {
        // These strings open every rendered log line.
        assert_eq!(format!("{}", Severity::Note), "note");
        assert_eq!(format!("{}", Severity::Warning), "warning");
        assert_eq!(format!("{}", Severity::Error), "error");
    }
}
