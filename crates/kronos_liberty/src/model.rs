//! Typed library schema: cells, pins, and timing arcs.
//!
//! The Liberty front-end flattens the source's nested string-keyed groups
//! into closed enumerations and tagged records. All names are interned
//! [`Ident`]s; the model is immutable after parsing and shared by reference
//! across the delay workers.

use crate::table::{LookupTable, TableKind};
use kronos_common::Ident;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A signal transition direction at a pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Transition {
    /// Low-to-high transition.
    Rise,
    /// High-to-low transition.
    Fall,
}

impl Transition {
    /// Returns the opposite transition direction.
    pub fn inverted(self) -> Transition {
        match self {
            Transition::Rise => Transition::Fall,
            Transition::Fall => Transition::Rise,
        }
    }
}

/// The direction of a cell pin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PinDirection {
    /// A data input pin.
    Input,
    /// An output pin.
    Output,
    /// A clock input pin (`direction : input` with `clock : true`).
    Clock,
    /// An internal pin, not visible on the cell boundary.
    Internal,
}

impl PinDirection {
    /// Returns `true` for input-direction pins (data inputs and clocks).
    pub fn is_input(self) -> bool {
        matches!(self, PinDirection::Input | PinDirection::Clock)
    }

    /// Returns `true` for output-direction pins.
    pub fn is_output(self) -> bool {
        self == PinDirection::Output
    }
}

/// The semantic type of a timing arc.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TimingType {
    /// A combinational propagation arc (Liberty default when no
    /// `timing_type` attribute is present).
    Combinational,
    /// Clock-to-output propagation from a rising clock edge.
    RisingEdge,
    /// Clock-to-output propagation from a falling clock edge.
    FallingEdge,
    /// Setup requirement against a rising related-pin edge.
    SetupRising,
    /// Setup requirement against a falling related-pin edge.
    SetupFalling,
    /// Hold requirement against a rising related-pin edge.
    HoldRising,
    /// Hold requirement against a falling related-pin edge.
    HoldFalling,
}

impl TimingType {
    /// Parses a Liberty `timing_type` attribute value.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "combinational" => Some(TimingType::Combinational),
            "rising_edge" => Some(TimingType::RisingEdge),
            "falling_edge" => Some(TimingType::FallingEdge),
            "setup_rising" => Some(TimingType::SetupRising),
            "setup_falling" => Some(TimingType::SetupFalling),
            "hold_rising" => Some(TimingType::HoldRising),
            "hold_falling" => Some(TimingType::HoldFalling),
            _ => None,
        }
    }

    /// Returns `true` for clock-edge propagation arcs.
    pub fn is_clock_edge(self) -> bool {
        matches!(self, TimingType::RisingEdge | TimingType::FallingEdge)
    }

    /// Returns `true` for setup-requirement arcs.
    pub fn is_setup(self) -> bool {
        matches!(self, TimingType::SetupRising | TimingType::SetupFalling)
    }

    /// Returns `true` for hold-requirement arcs.
    pub fn is_hold(self) -> bool {
        matches!(self, TimingType::HoldRising | TimingType::HoldFalling)
    }

    /// For constraint arcs, the related-pin edge the requirement is
    /// checked against.
    pub fn constraint_edge(self) -> Option<Transition> {
        match self {
            TimingType::SetupRising | TimingType::HoldRising => Some(Transition::Rise),
            TimingType::SetupFalling | TimingType::HoldFalling => Some(Transition::Fall),
            _ => None,
        }
    }
}

/// The unateness of a combinational arc: how the output transition
/// direction relates to the input transition direction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TimingSense {
    /// Output follows the input direction.
    PositiveUnate,
    /// Output inverts the input direction.
    NegativeUnate,
    /// Output direction is not determined by this input alone; treated as
    /// direction-preserving for worst-case table selection.
    NonUnate,
}

impl TimingSense {
    /// Parses a Liberty `timing_sense` attribute value.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "positive_unate" => Some(TimingSense::PositiveUnate),
            "negative_unate" => Some(TimingSense::NegativeUnate),
            "non_unate" => Some(TimingSense::NonUnate),
            _ => None,
        }
    }

    /// Applies the unateness rule: `negative_unate` inverts the input
    /// transition, `positive_unate` and `non_unate` preserve it.
    pub fn output_transition(self, input: Transition) -> Transition {
        match self {
            TimingSense::NegativeUnate => input.inverted(),
            TimingSense::PositiveUnate | TimingSense::NonUnate => input,
        }
    }
}

/// A filter for selecting arcs on a pin by their role.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ArcFilter {
    /// Combinational propagation arcs carrying delay/transition tables.
    Combinational,
    /// Clock-edge propagation arcs (clock-to-Q).
    ClockEdge,
    /// Setup-requirement arcs.
    Setup,
    /// Hold-requirement arcs.
    Hold,
}

impl ArcFilter {
    /// Returns `true` if an arc of the given type passes this filter.
    pub fn matches(self, timing_type: TimingType) -> bool {
        match self {
            ArcFilter::Combinational => timing_type == TimingType::Combinational,
            ArcFilter::ClockEdge => timing_type.is_clock_edge(),
            ArcFilter::Setup => timing_type.is_setup(),
            ArcFilter::Hold => timing_type.is_hold(),
        }
    }
}

/// A timing relationship from a related pin to the pin owning the arc.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimingArc {
    /// The source pin of the arc (e.g. `A` for an `A -> Y` arc, `CLK` for
    /// a `CLK -> Q` arc or a setup check on `D`).
    pub related_pin: Ident,
    /// The semantic type of the arc.
    pub timing_type: TimingType,
    /// Unateness; meaningful for combinational arcs.
    pub timing_sense: TimingSense,
    /// Characterized tables, keyed by their role.
    pub tables: Vec<(TableKind, LookupTable)>,
}

impl TimingArc {
    /// Returns the table of the given kind, if the arc carries one.
    pub fn table(&self, kind: TableKind) -> Option<&LookupTable> {
        self.tables
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, t)| t)
    }

    /// Returns `true` if the arc carries both delay and transition tables
    /// for the given output direction.
    pub fn has_delay_tables(&self, direction: Transition) -> bool {
        match direction {
            Transition::Rise => {
                self.table(TableKind::CellRise).is_some()
                    && self.table(TableKind::RiseTransition).is_some()
            }
            Transition::Fall => {
                self.table(TableKind::CellFall).is_some()
                    && self.table(TableKind::FallTransition).is_some()
            }
        }
    }
}

/// A pin on a library cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pin {
    /// The pin name.
    pub name: Ident,
    /// The pin direction.
    pub direction: PinDirection,
    /// The pin input capacitance, in library capacitance units.
    pub capacitance: f64,
    /// Timing arcs owned by this pin, in library order.
    pub arcs: Vec<TimingArc>,
}

impl Pin {
    /// Returns the arcs related to `related_pin` that pass `filter`, in
    /// library order.
    pub fn arcs_from(&self, related_pin: Ident, filter: ArcFilter) -> impl Iterator<Item = &TimingArc> {
        self.arcs
            .iter()
            .filter(move |a| a.related_pin == related_pin && filter.matches(a.timing_type))
    }
}

/// A characterized standard cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    /// The cell name.
    pub name: Ident,
    /// Pins in library order.
    pub pins: Vec<Pin>,
}

impl Cell {
    /// Returns the pin with the given name, if present.
    pub fn pin(&self, name: Ident) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }

    /// Returns the first arc on `pin` related to `related_pin` that passes
    /// `filter`.
    pub fn arc(&self, pin: Ident, related_pin: Ident, filter: ArcFilter) -> Option<&TimingArc> {
        self.pin(pin)?.arcs_from(related_pin, filter).next()
    }

    /// Returns the first arc on `pin` passing `filter`, regardless of its
    /// related pin. Used when the upstream pin is identified by the arc
    /// itself (e.g. clock-to-Q with a single clock pin).
    pub fn any_arc(&self, pin: Ident, filter: ArcFilter) -> Option<&TimingArc> {
        self.pin(pin)?
            .arcs
            .iter()
            .find(|a| filter.matches(a.timing_type))
    }

    /// Returns the output-direction pins of this cell, in library order.
    pub fn output_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.direction.is_output())
    }
}

/// A parsed Liberty library: a set of cells keyed by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Library {
    /// The library name.
    pub name: Ident,
    /// Cells keyed by cell name.
    pub cells: HashMap<Ident, Cell>,
}

impl Library {
    /// Creates an empty library.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            cells: HashMap::new(),
        }
    }

    /// Returns the cell with the given name, if present.
    pub fn cell(&self, name: Ident) -> Option<&Cell> {
        self.cells.get(&name)
    }

    /// Returns the capacitance of `pin` on `cell`, if both exist.
    pub fn pin_capacitance(&self, cell: Ident, pin: Ident) -> Option<f64> {
        Some(self.cell(cell)?.pin(pin)?.capacitance)
    }

    /// Returns the number of cells in the library.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
