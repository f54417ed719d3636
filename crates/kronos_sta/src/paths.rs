//! Timing-path enumeration.
//!
//! Paths run from a startpoint (primary input, or the output of a
//! sequential instance) to an endpoint (primary output, or the input of a
//! sequential instance), and are grouped into three classes enumerated
//! independently. Enumeration is a bounded BFS per startpoint: reaching an
//! endpoint emits the path and stops extension, sequential instances block
//! extension in every class, and a node already on the path is never
//! revisited. Emitted paths are deduplicated by their full node-index
//! sequence so diamond fanouts cannot produce the same path twice.

use crate::classify::Classifier;
use crate::graph::{FanoutIndex, NetlistGraph, NodeId, NodeKind};
use kronos_common::{Ident, Interner, SeqHash};
use kronos_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// The class of a timing path, by its startpoint/endpoint kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PathClass {
    /// Sequential output to sequential input.
    RegToReg,
    /// Primary input to sequential input.
    InToReg,
    /// Sequential output to primary output.
    RegToOut,
}

impl PathClass {
    /// Sort rank used for deterministic report ordering.
    pub fn rank(self) -> u8 {
        match self {
            PathClass::RegToReg => 0,
            PathClass::InToReg => 1,
            PathClass::RegToOut => 2,
        }
    }

    /// Short display name used in reports and logs.
    pub fn label(self) -> &'static str {
        match self {
            PathClass::RegToReg => "reg-reg",
            PathClass::InToReg => "in-reg",
            PathClass::RegToOut => "reg-out",
        }
    }
}

/// An enumerated timing path with its per-stage receiver-pin attributes.
///
/// `attrs[i]` is the receiver pin on the edge from `nodes[i]` to
/// `nodes[i + 1]` (`None` when the receiver is a primary output), so
/// `attrs.len() == nodes.len() - 1`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimingPath {
    /// The path class.
    pub class: PathClass,
    /// The node sequence from startpoint to endpoint.
    pub nodes: Vec<NodeId>,
    /// Receiver-pin labels parallel to the edges of `nodes`.
    pub attrs: Vec<Option<Ident>>,
}

impl TimingPath {
    /// The startpoint node.
    pub fn startpoint(&self) -> NodeId {
        self.nodes[0]
    }

    /// The endpoint node.
    pub fn endpoint(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }
}

/// Enumerates the three path classes over a built graph.
pub struct PathEnumerator<'a> {
    graph: &'a NetlistGraph,
    fanout: &'a FanoutIndex,
    classifier: &'a dyn Classifier,
    interner: &'a Interner,
    sink: &'a DiagnosticSink,
}

impl<'a> PathEnumerator<'a> {
    /// Creates an enumerator over the given graph.
    pub fn new(
        graph: &'a NetlistGraph,
        fanout: &'a FanoutIndex,
        classifier: &'a dyn Classifier,
        interner: &'a Interner,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            graph,
            fanout,
            classifier,
            interner,
            sink,
        }
    }

    /// Enumerates all classes and returns the paths in report order:
    /// sorted by (class, startpoint name, endpoint name, node sequence).
    pub fn enumerate_all(&self) -> Vec<TimingPath> {
        let mut paths = Vec::new();
        for class in [PathClass::RegToReg, PathClass::InToReg, PathClass::RegToOut] {
            paths.extend(self.enumerate_class(class));
        }
        paths.sort_by(|a, b| {
            let key = |p: &TimingPath| {
                (
                    p.class.rank(),
                    self.node_name(p.startpoint()).to_string(),
                    self.node_name(p.endpoint()).to_string(),
                    p.nodes.iter().map(|n| n.index()).collect::<Vec<_>>(),
                )
            };
            key(a).cmp(&key(b))
        });
        paths
    }

    /// Enumerates a single path class by bounded BFS from each startpoint.
    pub fn enumerate_class(&self, class: PathClass) -> Vec<TimingPath> {
        let mut out = Vec::new();
        let mut emitted: HashSet<SeqHash> = HashSet::new();

        for start in self.startpoints(class) {
            let mut visited: HashSet<SeqHash> = HashSet::new();
            let mut queue: VecDeque<Vec<NodeId>> = VecDeque::new();
            visited.insert(seq_hash(&[start]));
            queue.push_back(vec![start]);

            while let Some(path) = queue.pop_front() {
                let last = path[path.len() - 1];
                for &(successor, _) in self.fanout.of(last) {
                    if self.is_endpoint(class, successor) {
                        let mut complete = path.clone();
                        complete.push(successor);
                        if emitted.insert(seq_hash(&complete)) {
                            if let Some(timing_path) = self.finish_path(class, complete) {
                                out.push(timing_path);
                            }
                        }
                    } else if self.is_sequential_node(successor) {
                        // Sequential instances terminate propagation in
                        // every class; the paths beyond them belong to
                        // other startpoints.
                    } else if !path.contains(&successor) {
                        let mut extended = path.clone();
                        extended.push(successor);
                        if visited.insert(seq_hash(&extended)) {
                            queue.push_back(extended);
                        }
                    }
                }
            }
        }

        out
    }

    fn startpoints(&self, class: PathClass) -> Vec<NodeId> {
        self.graph
            .nodes
            .iter()
            .filter(|node| match class {
                PathClass::RegToReg | PathClass::RegToOut => self.is_sequential_node(node.id),
                PathClass::InToReg => node.is_primary_input(),
            })
            .map(|node| node.id)
            .collect()
    }

    fn is_endpoint(&self, class: PathClass, node: NodeId) -> bool {
        match class {
            PathClass::RegToReg | PathClass::InToReg => self.is_sequential_node(node),
            PathClass::RegToOut => self.graph.node(node).is_primary_output(),
        }
    }

    fn is_sequential_node(&self, node: NodeId) -> bool {
        match self.graph.node(node).kind {
            NodeKind::Instance { cell } => {
                self.classifier.is_sequential(self.interner.resolve(cell))
            }
            _ => false,
        }
    }

    fn node_name(&self, node: NodeId) -> &str {
        self.interner.resolve(self.graph.node(node).name)
    }

    /// Attaches the receiver-pin attributes to a complete node sequence.
    ///
    /// A path whose first edge carries no receiver pin identifies no arc,
    /// so it is logged and dropped here rather than failing delay
    /// computation later.
    fn finish_path(&self, class: PathClass, nodes: Vec<NodeId>) -> Option<TimingPath> {
        let attrs: Vec<Option<Ident>> = nodes
            .windows(2)
            .map(|pair| {
                self.graph
                    .edge_between(pair[0], pair[1])
                    .and_then(|edge| edge.receiver_pin)
            })
            .collect();

        if attrs.first().is_some_and(|a| a.is_none()) {
            self.sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Timing, 1),
                format!(
                    "skipping {} path from '{}': no receiver pin on its first edge",
                    class.label(),
                    self.node_name(nodes[0]),
                ),
            ));
            return None;
        }

        Some(TimingPath {
            class,
            nodes,
            attrs,
        })
    }
}

fn seq_hash(nodes: &[NodeId]) -> SeqHash {
    SeqHash::of_indices(nodes.iter().map(|n| n.index() as u32))
}
