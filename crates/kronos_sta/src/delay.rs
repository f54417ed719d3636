//! Per-stage and per-path delay computation.
//!
//! Implements the NLDM lookup model over the typed library: combinational
//! stage delay selected by unateness, clock-to-Q propagation at sequential
//! startpoints, and setup/hold constraint interpolation at sequential
//! endpoints. A stage's load is the sum of the receiver-pin capacitances of
//! **all** fanout successors of the driving node, not only the successor on
//! the current path; primary-output successors contribute the SDC
//! `set_load` value.
//!
//! Per-path computation is embarrassingly parallel: paths share the
//! immutable library and graph and produce independent delay maps, so
//! [`DelayEngine::compute_all`] fans the path list out over the rayon
//! worker pool. A [`CancelToken`] is checked at stage boundaries; cancelled
//! paths yield no partial results.

use crate::constraints::SdcConstraints;
use crate::graph::{FanoutIndex, NetlistGraph, NodeId, NodeKind};
use crate::paths::{PathClass, TimingPath};
use kronos_common::{round6, Ident, Interner, StaError, StaResult};
use kronos_liberty::{ArcFilter, Cell, Library, TableKind, TimingArc, TimingType, Transition};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared with the delay workers.
///
/// Cancellation is observed at the next stage boundary; a cancelled path
/// produces no delay map at all.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of in-flight work.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Which sequential requirement a constraint lookup checks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CheckKind {
    /// Data must be stable before the active clock edge.
    Setup,
    /// Data must be stable after the active clock edge.
    Hold,
}

impl CheckKind {
    fn filter(self) -> ArcFilter {
        match self {
            CheckKind::Setup => ArcFilter::Setup,
            CheckKind::Hold => ArcFilter::Hold,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CheckKind::Setup => "setup",
            CheckKind::Hold => "hold",
        }
    }
}

/// The result of one propagation lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageResult {
    /// Output transition time leaving the stage.
    pub transition: f64,
    /// Propagation delay through the stage.
    pub delay: f64,
    /// Output transition direction.
    pub direction: Transition,
}

/// The role of a stage within a path delay map.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StageKind {
    /// Clock-to-Q propagation at the sequential startpoint.
    ClockToQ,
    /// Combinational propagation through an intermediate cell.
    Combinational,
    /// The setup requirement at the sequential endpoint.
    Constraint,
}

/// One stage of a path delay map.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StageDelay {
    /// The node this stage belongs to.
    pub node: NodeId,
    /// The role of the stage.
    pub kind: StageKind,
    /// The stage delay, rounded to six fractional digits.
    pub delay: f64,
}

/// The per-path delay map: one scalar per stage, in path order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PathDelays {
    /// The stages in path order.
    pub stages: Vec<StageDelay>,
}

impl PathDelays {
    /// The data arrival time: the sum of the propagation stages
    /// (clock-to-Q and combinational; the endpoint constraint is not part
    /// of arrival).
    pub fn arrival(&self) -> f64 {
        self.stages
            .iter()
            .filter(|s| s.kind != StageKind::Constraint)
            .map(|s| s.delay)
            .sum()
    }

    /// The endpoint constraint time, if this path ends at a sequential
    /// input.
    pub fn constraint(&self) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.kind == StageKind::Constraint)
            .map(|s| s.delay)
    }
}

/// Computes stage and path delays against an immutable library and graph.
pub struct DelayEngine<'a> {
    library: &'a Library,
    graph: &'a NetlistGraph,
    fanout: &'a FanoutIndex,
    constraints: &'a SdcConstraints,
    interner: &'a Interner,
    q_pin: Ident,
    qn_pin: Ident,
    d_pin: Ident,
}

impl<'a> DelayEngine<'a> {
    /// Creates an engine over shared, immutable analysis state.
    pub fn new(
        library: &'a Library,
        graph: &'a NetlistGraph,
        fanout: &'a FanoutIndex,
        constraints: &'a SdcConstraints,
        interner: &'a Interner,
    ) -> Self {
        Self {
            library,
            graph,
            fanout,
            constraints,
            interner,
            q_pin: interner.get_or_intern("Q"),
            qn_pin: interner.get_or_intern("QN"),
            d_pin: interner.get_or_intern("D"),
        }
    }

    fn cell_named(&self, name: Ident) -> StaResult<&Cell> {
        self.library
            .cell(name)
            .ok_or_else(|| StaError::UnresolvedCell(self.interner.resolve(name).to_string()))
    }

    fn arc_not_found(&self, cell: Ident, pin: Ident, kind: &str) -> StaError {
        StaError::ArcNotFound {
            cell: self.interner.resolve(cell).to_string(),
            pin: self.interner.resolve(pin).to_string(),
            kind: kind.to_string(),
        }
    }

    /// The load capacitance seen by the output of `node`: the sum over all
    /// fanout successors of the receiver pin capacitance, with primary
    /// outputs contributing the configured `set_load`.
    pub fn stage_load(&self, node: NodeId) -> StaResult<f64> {
        let mut load = 0.0;
        for &(successor, receiver_pin) in self.fanout.of(node) {
            let successor_node = self.graph.node(successor);
            match successor_node.kind {
                NodeKind::PrimaryOutput => load += self.constraints.output_load,
                NodeKind::Instance { cell } => {
                    let Some(pin) = receiver_pin else {
                        continue;
                    };
                    let capacitance =
                        self.library.pin_capacitance(cell, pin).ok_or_else(|| {
                            StaError::UnresolvedPin {
                                cell: self.interner.resolve(cell).to_string(),
                                pin: self.interner.resolve(pin).to_string(),
                            }
                        })?;
                    load += capacitance;
                }
                NodeKind::PrimaryInput => {}
            }
        }
        Ok(load)
    }

    /// Combinational propagation through `cell` from `input_pin`.
    ///
    /// The arc is the one on an output pin whose `related_pin` is
    /// `input_pin`; its unateness decides whether the rise or fall tables
    /// apply to the output.
    pub fn combinational_delay(
        &self,
        cell_name: Ident,
        input_pin: Ident,
        input_transition: f64,
        input_direction: Transition,
        load: f64,
    ) -> StaResult<StageResult> {
        if input_transition < 0.0 || load < 0.0 {
            return Err(StaError::InvalidInput(
                "transition time and load capacitance must be non-negative".to_string(),
            ));
        }
        let cell = self.cell_named(cell_name)?;
        let arc = cell
            .output_pins()
            .find_map(|pin| pin.arcs_from(input_pin, ArcFilter::Combinational).next())
            .ok_or_else(|| self.arc_not_found(cell_name, input_pin, "combinational"))?;

        let direction = arc.timing_sense.output_transition(input_direction);
        self.propagate(arc, direction, input_transition, load, cell_name, input_pin)
    }

    /// Clock-to-Q propagation at a sequential cell.
    ///
    /// The output pin defaults to `Q`; when the cell has no `Q` pin the
    /// inverted `QN` variant is tried. The arc's `timing_type` selects the
    /// table pair and output direction.
    pub fn clk_to_q(
        &self,
        cell_name: Ident,
        clock_transition: f64,
        load: f64,
    ) -> StaResult<StageResult> {
        if clock_transition < 0.0 || load < 0.0 {
            return Err(StaError::InvalidInput(
                "transition time and load capacitance must be non-negative".to_string(),
            ));
        }
        let cell = self.cell_named(cell_name)?;
        let output_pin = [self.q_pin, self.qn_pin]
            .into_iter()
            .find(|&p| cell.pin(p).is_some_and(|pin| pin.direction.is_output()))
            .ok_or_else(|| self.arc_not_found(cell_name, self.q_pin, "clock-edge"))?;
        let arc = cell
            .any_arc(output_pin, ArcFilter::ClockEdge)
            .ok_or_else(|| self.arc_not_found(cell_name, output_pin, "clock-edge"))?;

        let direction = match arc.timing_type {
            TimingType::FallingEdge => Transition::Fall,
            _ => Transition::Rise,
        };
        self.propagate(arc, direction, clock_transition, load, cell_name, output_pin)
    }

    /// Setup or hold requirement at a sequential data pin.
    ///
    /// The arc is selected by `(check, edge)`: the constrained pin's arc of
    /// the matching checking kind, with its `timing_type` edge picking the
    /// rise or fall constraint table. Interpolation axes are the
    /// related-pin (clock) transition and the constrained-pin (data)
    /// transition.
    pub fn constraint_time(
        &self,
        cell_name: Ident,
        input_pin: Ident,
        check: CheckKind,
        related_transition: f64,
        constrained_transition: f64,
    ) -> StaResult<f64> {
        if related_transition < 0.0 || constrained_transition < 0.0 {
            return Err(StaError::InvalidInput(
                "transition times must be non-negative".to_string(),
            ));
        }
        let cell = self.cell_named(cell_name)?;
        let arc = cell
            .any_arc(input_pin, check.filter())
            .ok_or_else(|| self.arc_not_found(cell_name, input_pin, check.label()))?;

        let kind = match arc.timing_type.constraint_edge() {
            Some(Transition::Fall) => TableKind::FallConstraint,
            _ => TableKind::RiseConstraint,
        };
        let table = arc
            .table(kind)
            .ok_or_else(|| self.arc_not_found(cell_name, input_pin, "constraint table"))?;
        Ok(table.interpolate(related_transition, constrained_transition)?)
    }

    /// Looks up the delay/transition table pair for `direction` on `arc`
    /// and interpolates both at `(transition, load)`.
    fn propagate(
        &self,
        arc: &TimingArc,
        direction: Transition,
        transition: f64,
        load: f64,
        cell_name: Ident,
        pin: Ident,
    ) -> StaResult<StageResult> {
        let (delay_kind, transition_kind) = match direction {
            Transition::Rise => (TableKind::CellRise, TableKind::RiseTransition),
            Transition::Fall => (TableKind::CellFall, TableKind::FallTransition),
        };
        let delay_table = arc
            .table(delay_kind)
            .ok_or_else(|| self.arc_not_found(cell_name, pin, "delay table"))?;
        let transition_table = arc
            .table(transition_kind)
            .ok_or_else(|| self.arc_not_found(cell_name, pin, "transition table"))?;

        Ok(StageResult {
            transition: transition_table.interpolate(transition, load)?,
            delay: delay_table.interpolate(transition, load)?,
            direction,
        })
    }

    /// Computes the delay map for one path.
    ///
    /// Returns `Ok(None)` when cancellation is observed at a stage
    /// boundary. Sequential startpoints contribute a clock-to-Q stage;
    /// in-reg paths start from the configured clock transition at the
    /// primary input instead. Sequential endpoints contribute a setup
    /// constraint stage; reg-out paths end at the primary output without
    /// one.
    pub fn path_delays(
        &self,
        path: &TimingPath,
        token: &CancelToken,
    ) -> StaResult<Option<PathDelays>> {
        let mut stages = Vec::with_capacity(path.nodes.len());
        let last = path.nodes.len() - 1;
        let mut direction = Transition::Rise;
        let mut transition;

        match path.class {
            PathClass::RegToReg | PathClass::RegToOut => {
                if token.is_cancelled() {
                    return Ok(None);
                }
                let node = path.nodes[0];
                let cell = self.instance_cell(node)?;
                let load = self.stage_load(node)?;
                let result = self.clk_to_q(cell, self.constraints.clock_transition, load)?;
                stages.push(StageDelay {
                    node,
                    kind: StageKind::ClockToQ,
                    delay: round6(result.delay),
                });
                transition = result.transition;
                direction = result.direction;
            }
            PathClass::InToReg => {
                transition = self.constraints.clock_transition;
            }
        }

        for index in 1..last {
            if token.is_cancelled() {
                return Ok(None);
            }
            let node = path.nodes[index];
            let cell = self.instance_cell(node)?;
            let input_pin = path.attrs[index - 1].ok_or_else(|| {
                StaError::InvalidInput("interior path edge without a receiver pin".to_string())
            })?;
            let load = self.stage_load(node)?;
            let result =
                self.combinational_delay(cell, input_pin, transition, direction, load)?;
            stages.push(StageDelay {
                node,
                kind: StageKind::Combinational,
                delay: round6(result.delay),
            });
            transition = result.transition;
            direction = result.direction;
        }

        if matches!(path.class, PathClass::RegToReg | PathClass::InToReg) {
            if token.is_cancelled() {
                return Ok(None);
            }
            let node = path.nodes[last];
            let cell = self.instance_cell(node)?;
            // The constrained pin is the flop's data input D, regardless of
            // which input pin the final edge happens to enter (clock and
            // reset pins carry no data constraint of their own).
            let setup = self.constraint_time(
                cell,
                self.d_pin,
                CheckKind::Setup,
                self.constraints.clock_transition,
                transition,
            )?;
            stages.push(StageDelay {
                node,
                kind: StageKind::Constraint,
                delay: round6(setup),
            });
        }

        Ok(Some(PathDelays { stages }))
    }

    /// Computes delay maps for every path on the rayon worker pool.
    ///
    /// Entries are `None` for paths whose computation observed
    /// cancellation; output order matches the input path order.
    pub fn compute_all(
        &self,
        paths: &[TimingPath],
        token: &CancelToken,
    ) -> StaResult<Vec<Option<PathDelays>>> {
        paths
            .par_iter()
            .map(|path| self.path_delays(path, token))
            .collect()
    }

    fn instance_cell(&self, node: NodeId) -> StaResult<Ident> {
        self.graph.node(node).cell().ok_or_else(|| {
            StaError::InvalidInput(format!(
                "path node '{}' is not a cell instance",
                self.interner.resolve(self.graph.node(node).name)
            ))
        })
    }
}
