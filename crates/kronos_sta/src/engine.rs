//! The one-call analysis pipeline.
//!
//! Wires the stages together: graph construction from the parsed netlist
//! and library, path enumeration, parallel per-path delay computation, and
//! report generation. The library and graph are built once, are immutable
//! afterwards, and are shared by reference across the delay workers.

use crate::classify::Classifier;
use crate::constraints::SdcConstraints;
use crate::delay::{CancelToken, DelayEngine};
use crate::graph::{FanoutIndex, NetlistGraph};
use crate::paths::PathEnumerator;
use crate::report::{ClockParams, PathSummary, TimingReporter};
use kronos_common::{Interner, StaResult};
use kronos_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use kronos_liberty::Library;
use kronos_netlist::Netlist;

/// The complete result of an analysis run.
#[derive(Clone, Debug)]
pub struct StaReport {
    /// The human-readable per-path report.
    pub text: String,
    /// The CSV final report.
    pub csv: String,
    /// Per-path summaries in report order.
    pub summaries: Vec<PathSummary>,
    /// Number of enumerated paths (before delay computation).
    pub path_count: usize,
    /// Number of setup violations.
    pub violation_count: usize,
    /// The worst (smallest) slack across reported paths.
    pub worst_slack: Option<f64>,
}

/// Runs the full static timing analysis.
///
/// Returns `Ok(None)` when `token` was cancelled while delay computation
/// was in flight; partial results are discarded. Setup violations are
/// results, not errors: they appear in the report with `VIOLATE` status
/// and the run still returns `Ok`.
pub fn run_sta(
    netlist: &Netlist,
    library: &Library,
    constraints: &SdcConstraints,
    classifier: &dyn Classifier,
    interner: &Interner,
    sink: &DiagnosticSink,
    token: &CancelToken,
) -> StaResult<Option<StaReport>> {
    let graph = NetlistGraph::build(netlist, library, interner)?;
    let fanout = FanoutIndex::build(&graph);

    let enumerator = PathEnumerator::new(&graph, &fanout, classifier, interner, sink);
    let paths = enumerator.enumerate_all();
    sink.emit(Diagnostic::note(
        DiagnosticCode::new(Category::Timing, 100),
        format!(
            "graph: {} nodes, {} edges; enumerated {} paths",
            graph.node_count(),
            graph.edge_count(),
            paths.len()
        ),
    ));

    let engine = DelayEngine::new(library, &graph, &fanout, constraints, interner);
    let delays = engine.compute_all(&paths, token)?;
    if token.is_cancelled() {
        return Ok(None);
    }

    let params = ClockParams::from_constraints(constraints, interner);
    let reporter = TimingReporter::new(&graph, interner);
    let text = reporter.render_text(&paths, &delays, &params);
    let summaries = reporter.summarize(&paths, &delays, &params);
    let csv = reporter.render_csv(&summaries);

    let violation_count = summaries.iter().filter(|s| !s.met).count();
    let worst_slack = summaries
        .iter()
        .map(|s| s.slack)
        .fold(None, |worst: Option<f64>, slack| {
            Some(worst.map_or(slack, |w| w.min(slack)))
        });

    Ok(Some(StaReport {
        text,
        csv,
        path_count: paths.len(),
        violation_count,
        worst_slack,
        summaries,
    }))
}
