//! The shared error type for all Kronos analysis stages.

/// The standard result type for fallible analysis operations.
pub type StaResult<T> = Result<T, StaError>;

/// Errors that can occur during a static timing analysis run.
///
/// Every stage of the pipeline (front-end parsing, graph construction, path
/// enumeration, delay computation) reports failures through this enum, which
/// propagates to the entry point and is summarized in the run log. Setup
/// violations are *results*, not errors: they appear in the report with
/// `VIOLATE` status and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum StaError {
    /// A required input path does not exist.
    #[error("input not found: {0}")]
    InputNotFound(String),

    /// Malformed netlist, library, or constraint text.
    #[error("parse error in {file}: {message}")]
    ParseError {
        /// The input file that failed to parse.
        file: String,
        /// Description of the syntax problem.
        message: String,
    },

    /// A netlist instance references a cell absent from the library.
    #[error("unresolved cell '{0}'")]
    UnresolvedCell(String),

    /// A connection references a pin absent from the referenced cell.
    #[error("unresolved pin '{pin}' on cell '{cell}'")]
    UnresolvedPin {
        /// The referenced cell name.
        cell: String,
        /// The missing pin name.
        pin: String,
    },

    /// A net is driven by more than one output-direction pin.
    #[error("net '{0}' has multiple drivers")]
    MultipleDrivers(String),

    /// A required timing or constraint arc is absent on a pin.
    #[error("no {kind} arc on pin '{pin}' of cell '{cell}'")]
    ArcNotFound {
        /// The cell being queried.
        cell: String,
        /// The pin the arc was expected on.
        pin: String,
        /// The kind of arc requested (e.g. "clock-edge", "setup").
        kind: String,
    },

    /// A lookup table has empty index arrays or a value grid whose shape
    /// does not match its axes.
    #[error("invalid lookup table: {0}")]
    InvalidTable(String),

    /// A delay call received a negative transition time or load capacitance.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred reading inputs or writing reports.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_objects() {
        // The entry point prints these verbatim to stderr, so each message
        // must carry the name a user would search their inputs for.
        let cases: Vec<(StaError, &str)> = vec![
            (
                StaError::InputNotFound("design.v".to_string()),
                "input not found: design.v",
            ),
            (
                StaError::ParseError {
                    file: "cells.lib".to_string(),
                    message: "expected '{' at line 12".to_string(),
                },
                "parse error in cells.lib: expected '{' at line 12",
            ),
            (
                StaError::UnresolvedCell("MYSTERY".to_string()),
                "unresolved cell 'MYSTERY'",
            ),
            (
                StaError::UnresolvedPin {
                    cell: "AND2".to_string(),
                    pin: "Z".to_string(),
                },
                "unresolved pin 'Z' on cell 'AND2'",
            ),
            (
                StaError::MultipleDrivers("n7".to_string()),
                "net 'n7' has multiple drivers",
            ),
            (
                StaError::ArcNotFound {
                    cell: "DFRTP".to_string(),
                    pin: "D".to_string(),
                    kind: "setup".to_string(),
                },
                "no setup arc on pin 'D' of cell 'DFRTP'",
            ),
            (
                StaError::InvalidTable("empty index axis".to_string()),
                "invalid lookup table: empty index axis",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(format!("{err}"), expected);
        }
    }

    #[test]
    fn io_errors_propagate_through_question_mark() {
        fn read_missing() -> StaResult<String> {
            Ok(std::fs::read_to_string("/nonexistent/kronos/input")?)
        }
        let err = read_missing().unwrap_err();
        assert!(matches!(err, StaError::Io(_)));
        assert!(format!("{err}").starts_with("i/o error:"));
    }
}
