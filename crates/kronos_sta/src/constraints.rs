//! Timing constraint types parsed from SDC files.
//!
//! This module defines the data structures that represent the constraints
//! driving the analysis: the clock definition, clock transition and
//! uncertainty, boundary I/O delays, output load, and timing derates.

use kronos_common::Ident;
use serde::{Deserialize, Serialize};

/// Whether an I/O delay constrains an input or an output port.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum IoDelayKind {
    /// `set_input_delay`
    Input,
    /// `set_output_delay`
    Output,
}

/// Which analysis corner an I/O delay or derate applies to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DelayBound {
    /// `-max` (setup/late analysis).
    Max,
    /// `-min` (hold/early analysis).
    Min,
}

/// An input or output delay constraint at a boundary port.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IoDelay {
    /// The constrained port.
    pub port: Ident,
    /// Input or output delay.
    pub kind: IoDelayKind,
    /// Max (late) or min (early) bound.
    pub bound: DelayBound,
    /// The reference clock, if named.
    pub clock: Option<Ident>,
    /// The delay value.
    pub delay: f64,
}

/// A global timing derate from `set_timing_derate`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingDerate {
    /// The derating factor applied to path delays.
    pub factor: f64,
    /// Early (`-early`) or late (`-late`) paths.
    pub bound: DerateBound,
}

/// Which paths a derate applies to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DerateBound {
    /// Shortest-delay (hold) paths.
    Early,
    /// Longest-delay (setup) paths.
    Late,
}

/// The full constraint set for an analysis run.
///
/// Populated by the SDC parser and consumed by the delay engine and
/// reporter. Commands absent from the input keep their defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SdcConstraints {
    /// The clock name from `create_clock -name`, if any.
    pub clock_name: Option<Ident>,
    /// Clock period from `create_clock -period`.
    pub clock_period: f64,
    /// Clock transition time from `set_clock_transition`; also used as the
    /// related-pin transition for endpoint constraint lookups.
    pub clock_transition: f64,
    /// Setup uncertainty from `set_clock_uncertainty -setup`.
    pub setup_uncertainty: f64,
    /// Hold uncertainty from `set_clock_uncertainty -hold`.
    pub hold_uncertainty: f64,
    /// Boundary I/O delay constraints.
    pub io_delays: Vec<IoDelay>,
    /// Load applied to primary outputs, from `set_load ... [all_outputs]`.
    pub output_load: f64,
    /// Global timing derates.
    pub derates: Vec<TimingDerate>,
}

impl Default for SdcConstraints {
    fn default() -> Self {
        Self {
            clock_name: None,
            clock_period: 10.0,
            clock_transition: 0.15,
            setup_uncertainty: 0.0,
            hold_uncertainty: 0.0,
            io_delays: Vec::new(),
            output_load: 0.0,
            derates: Vec::new(),
        }
    }
}

impl SdcConstraints {
    /// Creates a constraint set with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the input delays of the given bound.
    pub fn input_delays(&self, bound: DelayBound) -> impl Iterator<Item = &IoDelay> {
        self.io_delays
            .iter()
            .filter(move |d| d.kind == IoDelayKind::Input && d.bound == bound)
    }

    /// Returns the derate factor for the given bound, if one was set.
    pub fn derate(&self, bound: DerateBound) -> Option<f64> {
        self.derates
            .iter()
            .find(|d| d.bound == bound)
            .map(|d| d.factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kronos_common::Interner;

    #[test]
    fn defaults() {
        let constraints = SdcConstraints::new();
        assert_eq!(constraints.clock_period, 10.0);
        assert_eq!(constraints.clock_transition, 0.15);
        assert_eq!(constraints.setup_uncertainty, 0.0);
        assert_eq!(constraints.output_load, 0.0);
        assert!(constraints.io_delays.is_empty());
        assert!(constraints.derates.is_empty());
    }

    #[test]
    fn input_delay_filter() {
        let interner = Interner::new();
        let mut constraints = SdcConstraints::new();
        constraints.io_delays.push(IoDelay {
            port: interner.get_or_intern("din"),
            kind: IoDelayKind::Input,
            bound: DelayBound::Max,
            clock: None,
            delay: 2.0,
        });
        constraints.io_delays.push(IoDelay {
            port: interner.get_or_intern("dout"),
            kind: IoDelayKind::Output,
            bound: DelayBound::Max,
            clock: None,
            delay: 1.0,
        });
        assert_eq!(constraints.input_delays(DelayBound::Max).count(), 1);
        assert_eq!(constraints.input_delays(DelayBound::Min).count(), 0);
    }

    #[test]
    fn derate_lookup() {
        let mut constraints = SdcConstraints::new();
        constraints.derates.push(TimingDerate {
            factor: 0.95,
            bound: DerateBound::Early,
        });
        constraints.derates.push(TimingDerate {
            factor: 1.05,
            bound: DerateBound::Late,
        });
        assert_eq!(constraints.derate(DerateBound::Early), Some(0.95));
        assert_eq!(constraints.derate(DerateBound::Late), Some(1.05));
    }

    #[test]
    fn serde_roundtrip() {
        let constraints = SdcConstraints::new();
        let json = serde_json::to_string(&constraints).unwrap();
        let back: SdcConstraints = serde_json::from_str(&json).unwrap();
        assert_eq!(back.clock_period, 10.0);
    }
}
