//! Characterized lookup tables and 2-D interpolation.
//!
//! Delay, transition, and constraint data in a Liberty library are 2-D
//! tables indexed by two axes. For delay and transition tables, `index_1`
//! is the input transition time and `index_2` the output load capacitance;
//! for constraint tables, `index_1` is the related-pin transition and
//! `index_2` the constrained-pin transition.

use kronos_common::{StaError, StaResult};
use serde::{Deserialize, Serialize};

/// The role of a lookup table within a timing arc.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TableKind {
    /// Propagation delay for a rising output.
    CellRise,
    /// Propagation delay for a falling output.
    CellFall,
    /// Output transition time for a rising output.
    RiseTransition,
    /// Output transition time for a falling output.
    FallTransition,
    /// Setup/hold requirement checked against a rising constrained pin.
    RiseConstraint,
    /// Setup/hold requirement checked against a falling constrained pin.
    FallConstraint,
}

impl TableKind {
    /// Parses a Liberty group name into a table kind.
    pub fn from_group_name(name: &str) -> Option<Self> {
        match name {
            "cell_rise" => Some(TableKind::CellRise),
            "cell_fall" => Some(TableKind::CellFall),
            "rise_transition" => Some(TableKind::RiseTransition),
            "fall_transition" => Some(TableKind::FallTransition),
            "rise_constraint" => Some(TableKind::RiseConstraint),
            "fall_constraint" => Some(TableKind::FallConstraint),
            _ => None,
        }
    }
}

/// A 2-D characterized lookup table.
///
/// Both index axes are ordered, strictly increasing floats, and the value
/// grid has shape `(|index_1|, |index_2|)`. Tables with a single sample on
/// an axis degenerate to 1-D (or 0-D) lookups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    /// First index axis.
    pub index_1: Vec<f64>,
    /// Second index axis.
    pub index_2: Vec<f64>,
    /// Value grid, row-major: `values[i][j]` corresponds to
    /// `(index_1[i], index_2[j])`.
    pub values: Vec<Vec<f64>>,
}

impl LookupTable {
    /// Creates a table and validates its shape.
    pub fn new(index_1: Vec<f64>, index_2: Vec<f64>, values: Vec<Vec<f64>>) -> StaResult<Self> {
        let table = Self {
            index_1,
            index_2,
            values,
        };
        table.validate()?;
        Ok(table)
    }

    /// Checks that the axes are non-empty and strictly increasing and that
    /// the value grid shape matches the axes.
    pub fn validate(&self) -> StaResult<()> {
        if self.index_1.is_empty() || self.index_2.is_empty() {
            return Err(StaError::InvalidTable("empty index axis".to_string()));
        }
        for axis in [&self.index_1, &self.index_2] {
            if axis.windows(2).any(|w| w[0] >= w[1]) {
                return Err(StaError::InvalidTable(
                    "index axis is not strictly increasing".to_string(),
                ));
            }
        }
        if self.values.len() != self.index_1.len()
            || self.values.iter().any(|row| row.len() != self.index_2.len())
        {
            return Err(StaError::InvalidTable(format!(
                "value grid shape does not match axes ({} x {})",
                self.index_1.len(),
                self.index_2.len()
            )));
        }
        Ok(())
    }

    /// Interpolates the table at `(x, y)` with the standard NLDM bilinear
    /// formula.
    ///
    /// On each axis the bracketing sample pair is selected; targets outside
    /// the axis range use the outermost pair, so the same linear form
    /// extrapolates (with weights outside `[0, 1]`). Callers wanting
    /// clamped behavior should clamp the target first. Axes with a single
    /// sample collapse to 1-D interpolation on the other axis; if both
    /// collapse, the single grid value is returned.
    pub fn interpolate(&self, x: f64, y: f64) -> StaResult<f64> {
        self.validate()?;

        let (i1, i2, alpha) = bracket(&self.index_1, x);
        let (j1, j2, beta) = bracket(&self.index_2, y);

        let t11 = self.values[i1][j1];
        let t12 = self.values[i1][j2];
        let t21 = self.values[i2][j1];
        let t22 = self.values[i2][j2];

        Ok((1.0 - alpha) * (1.0 - beta) * t11
            + (1.0 - alpha) * beta * t12
            + alpha * (1.0 - beta) * t21
            + alpha * beta * t22)
    }
}

/// Selects the sample pair bracketing `target` on `axis` and the linear
/// weight of the upper sample. A single-sample axis yields `(0, 0, 0.0)`.
fn bracket(axis: &[f64], target: f64) -> (usize, usize, f64) {
    if axis.len() == 1 {
        return (0, 0, 0.0);
    }
    // partition_point gives the first sample >= target; shift to the pair
    // (lo, lo + 1) that brackets, clamping to the outermost pair.
    let hi = axis.partition_point(|&a| a < target).clamp(1, axis.len() - 1);
    let lo = hi - 1;
    let alpha = (target - axis[lo]) / (axis[hi] - axis[lo]);
    (lo, hi, alpha)
}
