//! Typed netlist model produced by the parser.

use kronos_common::Ident;
use serde::{Deserialize, Serialize};

/// A parsed structural netlist: one synthesized module.
///
/// Multi-bit port and wire declarations are expanded to one entry per bit
/// (`name__i`), matching the normalization applied to bit-selects in the
/// module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    /// The module name.
    pub name: Ident,
    /// Primary input nets, in declaration order.
    pub inputs: Vec<Ident>,
    /// Primary output nets, in declaration order.
    pub outputs: Vec<Ident>,
    /// Internal wire nets, in declaration order.
    pub wires: Vec<Ident>,
    /// Cell instances, in declaration order.
    pub instances: Vec<Instance>,
}

impl Netlist {
    /// Returns the instance with the given name, if present.
    pub fn instance(&self, name: Ident) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }
}

/// An instance of a library cell with named port bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// The instance name.
    pub name: Ident,
    /// The referenced library cell name.
    pub cell: Ident,
    /// Port bindings in source order.
    pub connections: Vec<PortConnection>,
}

impl Instance {
    /// Returns the net bound to the given pin, if any.
    pub fn net_on(&self, pin: Ident) -> Option<Ident> {
        self.connections
            .iter()
            .find(|c| c.pin == pin)
            .map(|c| c.net)
    }
}

/// A single named port binding: `.PIN(net)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConnection {
    /// The cell pin being bound.
    pub pin: Ident,
    /// The net bound to the pin.
    pub net: Ident,
}
