//! Netlist graph data structures for static timing analysis.
//!
//! The [`NetlistGraph`] is a directed graph over primary ports and cell
//! instances. Nodes and edges live in flat arrays indexed by [`NodeId`] /
//! [`EdgeId`], which makes path sequences cheap to compare and hash and
//! avoids aliasing between the graph, the fanout index, and the path lists.
//! Each edge carries the receiver's input pin name (absent only for edges
//! driving a primary output), which is what the delay engine needs to pick
//! timing arcs and load capacitances.

use kronos_common::{Ident, Interner, StaError, StaResult};
use kronos_liberty::Library;
use kronos_netlist::Netlist;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Position of a node in the graph's flat `nodes` array.
///
/// Handing paths around as sequences of these keeps duplicate-path
/// detection a hash over `u32`s and never aliases graph storage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Wraps an index into [`NetlistGraph::nodes`].
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// The node's position in the flat array.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of an edge in the graph's flat `edges` array.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Wraps an index into [`NetlistGraph::edges`].
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// The edge's position in the flat array.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The functional type of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A primary input port of the design.
    PrimaryInput,
    /// A primary output port of the design.
    PrimaryOutput,
    /// A cell instance; carries the referenced library cell name.
    Instance {
        /// The library cell this instance references.
        cell: Ident,
    },
}

/// A node in the netlist graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// The unique ID of this node.
    pub id: NodeId,
    /// Port name for primary ports, instance name for instances.
    pub name: Ident,
    /// The functional type of this node.
    pub kind: NodeKind,
}

impl Node {
    /// Returns the referenced cell name for instance nodes.
    pub fn cell(&self) -> Option<Ident> {
        match self.kind {
            NodeKind::Instance { cell } => Some(cell),
            _ => None,
        }
    }

    /// Returns `true` if this node is a primary input port.
    pub fn is_primary_input(&self) -> bool {
        self.kind == NodeKind::PrimaryInput
    }

    /// Returns `true` if this node is a primary output port.
    pub fn is_primary_output(&self) -> bool {
        self.kind == NodeKind::PrimaryOutput
    }
}

/// A directed edge from a driver node to a receiver node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// The unique ID of this edge.
    pub id: EdgeId,
    /// The driving node.
    pub from: NodeId,
    /// The receiving node.
    pub to: NodeId,
    /// The input pin on the receiver; `None` only for edges into a
    /// primary output.
    pub receiver_pin: Option<Ident>,
}

/// A directed graph of primary ports and cell instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetlistGraph {
    /// All nodes, indexed by [`NodeId`].
    pub nodes: Vec<Node>,
    /// All directed edges, indexed by [`EdgeId`].
    pub edges: Vec<Edge>,
}

impl NetlistGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its ID.
    pub fn add_node(&mut self, name: Ident, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node { id, name, kind });
        id
    }

    /// Adds a directed edge and returns its ID.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, receiver_pin: Option<Ident>) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Edge {
            id,
            from,
            to,
            receiver_pin,
        });
        id
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the edge with the given ID.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Returns the total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the first edge from `from` to `to`, if any.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }

    /// Builds the graph from a parsed netlist and library.
    ///
    /// Pin directions come from the library (the netlist itself carries no
    /// direction information), so every instance must reference a library
    /// cell and every binding a pin on it. For each net, the single
    /// output-direction pin is the driver and every input-direction pin a
    /// receiver; nets with two output-direction pins are rejected.
    pub fn build(
        netlist: &Netlist,
        library: &Library,
        interner: &Interner,
    ) -> StaResult<NetlistGraph> {
        let mut graph = NetlistGraph::new();

        // Gather per-net driver and receiver pins while creating instance
        // nodes in declaration order; first-seen net order keeps edge
        // construction deterministic.
        #[derive(Default)]
        struct NetBinding {
            drivers: Vec<NodeId>,
            receivers: Vec<(NodeId, Ident)>,
        }
        let mut net_order: Vec<Ident> = Vec::new();
        let mut bindings: HashMap<Ident, NetBinding> = HashMap::new();

        for instance in &netlist.instances {
            let Some(cell) = library.cell(instance.cell) else {
                return Err(StaError::UnresolvedCell(
                    interner.resolve(instance.cell).to_string(),
                ));
            };
            let node = graph.add_node(
                instance.name,
                NodeKind::Instance {
                    cell: instance.cell,
                },
            );
            for connection in &instance.connections {
                let Some(pin) = cell.pin(connection.pin) else {
                    return Err(StaError::UnresolvedPin {
                        cell: interner.resolve(instance.cell).to_string(),
                        pin: interner.resolve(connection.pin).to_string(),
                    });
                };
                let binding = bindings.entry(connection.net).or_insert_with(|| {
                    net_order.push(connection.net);
                    NetBinding::default()
                });
                if pin.direction.is_output() {
                    binding.drivers.push(node);
                } else if pin.direction.is_input() {
                    binding.receivers.push((node, connection.pin));
                }
            }
        }

        for &net in &net_order {
            if bindings[&net].drivers.len() > 1 {
                return Err(StaError::MultipleDrivers(interner.resolve(net).to_string()));
            }
        }

        let output_set: HashSet<Ident> = netlist.outputs.iter().copied().collect();
        let input_set: HashSet<Ident> = netlist.inputs.iter().copied().collect();

        // Primary inputs drive every instance pin bound to their net.
        for &net in &netlist.inputs {
            let input_node = graph.add_node(net, NodeKind::PrimaryInput);
            if let Some(binding) = bindings.get(&net) {
                for &(receiver, pin) in &binding.receivers {
                    graph.add_edge(input_node, receiver, Some(pin));
                }
            }
        }

        // Internal nets: driver to each receiver, labeled with the
        // receiver's input pin. Pairs of two inputs are not connected.
        for &net in &net_order {
            if input_set.contains(&net) || output_set.contains(&net) {
                continue;
            }
            let binding = &bindings[&net];
            if let Some(&driver) = binding.drivers.first() {
                for &(receiver, pin) in &binding.receivers {
                    graph.add_edge(driver, receiver, Some(pin));
                }
            }
        }

        // Primary outputs: unlabeled edge from the driving instance. A
        // primary-output net consumed as a pin input elsewhere also gets
        // the labeled driver-to-receiver edges.
        for &net in &netlist.outputs {
            let output_node = graph.add_node(net, NodeKind::PrimaryOutput);
            if let Some(binding) = bindings.get(&net) {
                if let Some(&driver) = binding.drivers.first() {
                    graph.add_edge(driver, output_node, None);
                    for &(receiver, pin) in &binding.receivers {
                        graph.add_edge(driver, receiver, Some(pin));
                    }
                }
            }
        }

        Ok(graph)
    }
}

/// Precomputed successor lists: for each node, its fanout as
/// `(successor, receiver_pin)` pairs in edge insertion order.
///
/// The delay engine uses this both to walk paths and to sum the receiver
/// pin capacitances that form a stage's load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutIndex {
    entries: Vec<Vec<(NodeId, Option<Ident>)>>,
}

impl FanoutIndex {
    /// Builds the index by walking every node's outgoing edges.
    pub fn build(graph: &NetlistGraph) -> Self {
        let mut entries = vec![Vec::new(); graph.node_count()];
        for edge in &graph.edges {
            entries[edge.from.index()].push((edge.to, edge.receiver_pin));
        }
        Self { entries }
    }

    /// Returns the fanout of the given node.
    pub fn of(&self, node: NodeId) -> &[(NodeId, Option<Ident>)] {
        &self.entries[node.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kronos_diagnostics::DiagnosticSink;
    use kronos_liberty::parse_library;
    use kronos_netlist::parse_netlist;

    const LIB: &str = r#"
library (testlib) {
  cell (AND2) {
    pin (A) { direction : input; capacitance : 0.01; }
    pin (B) { direction : input; capacitance : 0.01; }
    pin (Y) { direction : output; }
  }
  cell (DFRTP) {
    pin (CLK) { direction : input; clock : true; capacitance : 0.001; }
    pin (D) { direction : input; capacitance : 0.002; }
    pin (Q) { direction : output; }
  }
}
"#;

    const NETLIST: &str = r#"
module top (clk, a, b, y);
  input clk;
  input a;
  input b;
  output y;
  wire n1;

  AND2 u1 ( .A(a), .B(b), .Y(n1) );
  DFRTP r1 ( .CLK(clk), .D(n1), .Q(y) );
endmodule
"#;

    fn build(lib: &str, netlist: &str) -> (StaResult<NetlistGraph>, Interner) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let library = parse_library(lib, "t.lib", &interner, &sink).unwrap();
        let parsed = parse_netlist(netlist, "t.v", &interner, &sink).unwrap();
        let graph = NetlistGraph::build(&parsed, &library, &interner);
        (graph, interner)
    }

    fn node_by_name(graph: &NetlistGraph, interner: &Interner, name: &str) -> NodeId {
        let ident = interner.get_or_intern(name);
        graph.nodes.iter().find(|n| n.name == ident).unwrap().id
    }

    #[test]
    fn ids_index_the_flat_arrays() {
        let (graph, _) = build(LIB, NETLIST);
        let graph = graph.unwrap();
        for (position, node) in graph.nodes.iter().enumerate() {
            assert_eq!(node.id.index(), position);
            assert_eq!(graph.node(node.id).name, node.name);
        }
        for (position, edge) in graph.edges.iter().enumerate() {
            assert_eq!(edge.id.index(), position);
            assert_eq!(graph.edge(edge.id).from, edge.from);
        }
    }

    #[test]
    fn builds_nodes_and_edges() {
        let (graph, interner) = build(LIB, NETLIST);
        let graph = graph.unwrap();
        // 2 instances + 3 primary inputs + 1 primary output
        assert_eq!(graph.node_count(), 6);

        let u1 = node_by_name(&graph, &interner, "u1");
        let r1 = node_by_name(&graph, &interner, "r1");
        let y = node_by_name(&graph, &interner, "y");

        let edge = graph.edge_between(u1, r1).unwrap();
        assert_eq!(edge.receiver_pin, Some(interner.get_or_intern("D")));

        let out = graph.edge_between(r1, y).unwrap();
        assert_eq!(out.receiver_pin, None);
    }

    #[test]
    fn primary_inputs_drive_labeled_edges() {
        let (graph, interner) = build(LIB, NETLIST);
        let graph = graph.unwrap();
        let a = node_by_name(&graph, &interner, "a");
        let u1 = node_by_name(&graph, &interner, "u1");
        let edge = graph.edge_between(a, u1).unwrap();
        assert_eq!(edge.receiver_pin, Some(interner.get_or_intern("A")));
    }

    #[test]
    fn clock_pin_is_a_receiver() {
        let (graph, interner) = build(LIB, NETLIST);
        let graph = graph.unwrap();
        let clk = node_by_name(&graph, &interner, "clk");
        let r1 = node_by_name(&graph, &interner, "r1");
        let edge = graph.edge_between(clk, r1).unwrap();
        assert_eq!(edge.receiver_pin, Some(interner.get_or_intern("CLK")));
    }

    #[test]
    fn unresolved_cell_rejected() {
        let netlist = r#"
module top (a, y);
  input a;
  output y;
  MYSTERY u1 ( .A(a), .Y(y) );
endmodule
"#;
        let (graph, _) = build(LIB, netlist);
        let err = graph.unwrap_err();
        assert!(matches!(err, StaError::UnresolvedCell(name) if name == "MYSTERY"));
    }

    #[test]
    fn unresolved_pin_rejected() {
        let netlist = r#"
module top (a, y);
  input a;
  output y;
  AND2 u1 ( .A(a), .Z(y) );
endmodule
"#;
        let (graph, _) = build(LIB, netlist);
        let err = graph.unwrap_err();
        assert!(matches!(err, StaError::UnresolvedPin { pin, .. } if pin == "Z"));
    }

    #[test]
    fn multiple_drivers_rejected() {
        let netlist = r#"
module top (a, b, y);
  input a;
  input b;
  output y;
  wire n1;
  AND2 u1 ( .A(a), .B(b), .Y(n1) );
  AND2 u2 ( .A(a), .B(b), .Y(n1) );
  AND2 u3 ( .A(n1), .B(b), .Y(y) );
endmodule
"#;
        let (graph, _) = build(LIB, netlist);
        let err = graph.unwrap_err();
        assert!(matches!(err, StaError::MultipleDrivers(net) if net == "n1"));
    }

    #[test]
    fn two_inputs_on_a_net_not_connected() {
        // A net feeding two input pins with no driver yields no edges.
        let netlist = r#"
module top (a, y);
  input a;
  output y;
  wire floating;
  AND2 u1 ( .A(floating), .B(a), .Y(y) );
  AND2 u2 ( .A(floating), .B(a), .Y(y2) );
  wire y2;
endmodule
"#;
        let (graph, interner) = build(LIB, netlist);
        let graph = graph.unwrap();
        let u1 = node_by_name(&graph, &interner, "u1");
        let u2 = node_by_name(&graph, &interner, "u2");
        assert!(graph.edge_between(u1, u2).is_none());
        assert!(graph.edge_between(u2, u1).is_none());
    }

    #[test]
    fn fanout_index_matches_edges() {
        let (graph, interner) = build(LIB, NETLIST);
        let graph = graph.unwrap();
        let fanout = FanoutIndex::build(&graph);

        let u1 = node_by_name(&graph, &interner, "u1");
        let r1 = node_by_name(&graph, &interner, "r1");
        assert_eq!(fanout.of(u1), &[(r1, Some(interner.get_or_intern("D")))]);

        let y = node_by_name(&graph, &interner, "y");
        assert_eq!(fanout.of(r1), &[(y, None)]);
        assert!(fanout.of(y).is_empty());
    }

    #[test]
    fn diamond_fanout_lists_both_receivers() {
        let netlist = r#"
module top (a, b, y);
  input a;
  input b;
  output y;
  wire n1;
  AND2 u0 ( .A(a), .B(b), .Y(n1) );
  AND2 u1 ( .A(n1), .B(b), .Y(y2) );
  AND2 u2 ( .A(n1), .B(b), .Y(y3) );
  wire y2;
  wire y3;
endmodule
"#;
        let (graph, interner) = build(LIB, netlist);
        let graph = graph.unwrap();
        let fanout = FanoutIndex::build(&graph);
        let u0 = node_by_name(&graph, &interner, "u0");
        assert_eq!(fanout.of(u0).len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let (graph, _) = build(LIB, NETLIST);
        let graph = graph.unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let restored: NetlistGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.node_count(), graph.node_count());
        assert_eq!(restored.edge_count(), graph.edge_count());
    }
}
