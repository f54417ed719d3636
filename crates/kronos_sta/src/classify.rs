//! Sequential-cell classification.
//!
//! Timing startpoints and endpoints are the pins of sequential cells, but a
//! synthesized netlist carries no "this is a flip-flop" marker. Cells are
//! classified by name instead: a configured, ordered list of substrings
//! (one per line in an `ff_names.txt` file), where a cell is sequential iff
//! its name contains any listed substring. The rule is imprecise, so the
//! classifier is pluggable behind a trait.

use kronos_common::StaResult;
use std::path::Path;

/// Decides whether a cell is sequential (a timing startpoint/endpoint).
pub trait Classifier {
    /// Returns `true` if the named cell is sequential.
    fn is_sequential(&self, cell_name: &str) -> bool;
}

/// Substring-based classifier driven by a configured name list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringClassifier {
    patterns: Vec<String>,
}

impl SubstringClassifier {
    /// Creates a classifier from a pattern list.
    ///
    /// Patterns are trimmed; empty entries are dropped and duplicates
    /// removed, keeping first-occurrence order.
    pub fn new(patterns: impl IntoIterator<Item = String>) -> Self {
        let mut seen = Vec::new();
        for pattern in patterns {
            let pattern = pattern.trim().to_string();
            if !pattern.is_empty() && !seen.contains(&pattern) {
                seen.push(pattern);
            }
        }
        Self { patterns: seen }
    }

    /// Loads patterns from a file with one substring per line.
    pub fn from_file(path: &Path) -> StaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(content.lines().map(str::to_string)))
    }

    /// The built-in fallback list used when no `ff_names.txt` is supplied.
    pub fn default_patterns() -> Self {
        Self::new(
            ["dfrtp", "sdfrtp", "dfxtp", "dfstp", "ff"]
                .into_iter()
                .map(str::to_string),
        )
    }

    /// Returns the configured patterns in match order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Classifier for SubstringClassifier {
    fn is_sequential(&self, cell_name: &str) -> bool {
        self.patterns.iter().any(|p| cell_name.contains(p))
    }
}
