//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `L101` for a Liberty front-end issue, `T010` for a timing
/// engine issue).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Liberty library front-end diagnostics, prefixed with `L`.
    Liberty,
    /// Netlist front-end diagnostics, prefixed with `N`.
    Netlist,
    /// Constraint (SDC) front-end diagnostics, prefixed with `S`.
    Sdc,
    /// Timing engine diagnostics, prefixed with `T`.
    Timing,
    /// General errors, prefixed with `E`.
    Error,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Liberty => 'L',
            Category::Netlist => 'N',
            Category::Sdc => 'S',
            Category::Timing => 'T',
            Category::Error => 'E',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `L101`, `N203`, `T010`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
