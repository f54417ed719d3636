//! Per-path timing report generation.
//!
//! For each path with a delay map, emits a three-column `{Point, Incr,
//! Path}` block: the clock preamble, the clock-to-Q and combinational
//! stages with a running cumulative, the data arrival time, then the
//! required-time derivation (clock period, network delay, uncertainty,
//! setup time) and the slack summary. The summary `data arrival time` row
//! shows the negated cumulative, following the standard required − arrival
//! presentation; slack itself is computed from the non-negated value.
//!
//! A compact CSV (one row per path) accompanies the text report for
//! downstream tooling.

use crate::constraints::SdcConstraints;
use crate::delay::{PathDelays, StageKind};
use crate::graph::{NetlistGraph, NodeId, NodeKind};
use crate::paths::TimingPath;
use kronos_common::Interner;
use serde::{Deserialize, Serialize};

/// Clock parameters applied to every report block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClockParams {
    /// The clock (path group) name.
    pub name: String,
    /// Time of the launching rise edge.
    pub rise_edge: f64,
    /// Ideal clock network delay.
    pub network_delay: f64,
    /// Setup uncertainty subtracted from the required time.
    pub uncertainty: f64,
    /// The clock period.
    pub period: f64,
}

impl ClockParams {
    /// Derives report clock parameters from the SDC constraints.
    pub fn from_constraints(constraints: &SdcConstraints, interner: &Interner) -> Self {
        Self {
            name: constraints
                .clock_name
                .map(|n| interner.resolve(n).to_string())
                .unwrap_or_else(|| "core_clock".to_string()),
            rise_edge: 0.0,
            network_delay: 0.0,
            uncertainty: constraints.setup_uncertainty,
            period: constraints.clock_period,
        }
    }
}

/// One row of the final CSV report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathSummary {
    /// Stable identifier, `path1`, `path2`, ... in report order.
    pub path_id: String,
    /// Startpoint node name.
    pub startpoint: String,
    /// Endpoint node name.
    pub endpoint: String,
    /// Data arrival time.
    pub arrival: f64,
    /// Data required time.
    pub required: f64,
    /// `required - arrival`.
    pub slack: f64,
    /// `true` when the setup check is met (slack >= 0).
    pub met: bool,
}

/// Renders per-path timing reports from delay maps.
pub struct TimingReporter<'a> {
    graph: &'a NetlistGraph,
    interner: &'a Interner,
}

impl<'a> TimingReporter<'a> {
    /// Creates a reporter over the analyzed graph.
    pub fn new(graph: &'a NetlistGraph, interner: &'a Interner) -> Self {
        Self { graph, interner }
    }

    /// Renders the full text report: one block per path with a delay map,
    /// blank line between blocks, in the given path order.
    pub fn render_text(
        &self,
        paths: &[TimingPath],
        delays: &[Option<PathDelays>],
        params: &ClockParams,
    ) -> String {
        let mut out = String::new();
        for (path, delay_map) in paths.iter().zip(delays) {
            let Some(delay_map) = delay_map else {
                continue;
            };
            if delay_map.stages.is_empty() {
                continue;
            }
            self.render_block(path, delay_map, params, &mut out);
            out.push('\n');
        }
        out
    }

    /// Builds the per-path summaries in report order.
    pub fn summarize(
        &self,
        paths: &[TimingPath],
        delays: &[Option<PathDelays>],
        params: &ClockParams,
    ) -> Vec<PathSummary> {
        let mut summaries = Vec::new();
        for (path, delay_map) in paths.iter().zip(delays) {
            let Some(delay_map) = delay_map else {
                continue;
            };
            if delay_map.stages.is_empty() {
                continue;
            }
            let arrival = delay_map.arrival();
            let required = required_time(delay_map, params);
            let slack = required - arrival;
            summaries.push(PathSummary {
                path_id: format!("path{}", summaries.len() + 1),
                startpoint: self.node_name(path.startpoint()).to_string(),
                endpoint: self.node_name(path.endpoint()).to_string(),
                arrival,
                required,
                slack,
                met: slack >= 0.0,
            });
        }
        summaries
    }

    /// Renders the CSV final report.
    pub fn render_csv(&self, summaries: &[PathSummary]) -> String {
        let mut out = String::from("path_id,startpoint,endpoint,arrival,required,slack,status\n");
        for summary in summaries {
            out.push_str(&format!(
                "{},{},{},{:.6},{:.6},{:.6},{}\n",
                summary.path_id,
                summary.startpoint,
                summary.endpoint,
                summary.arrival,
                summary.required,
                summary.slack,
                if summary.met { "MET" } else { "VIOLATE" },
            ));
        }
        out
    }

    fn render_block(
        &self,
        path: &TimingPath,
        delays: &PathDelays,
        params: &ClockParams,
        out: &mut String,
    ) {
        let startpoint = path.startpoint();
        let endpoint = path.endpoint();
        out.push_str(&format!(
            "Startpoint: {} ({} clocked by {})\n",
            self.node_name(startpoint),
            self.endpoint_kind(startpoint),
            params.name,
        ));
        out.push_str(&format!(
            "Endpoint: {} ({} clocked by {})\n",
            self.node_name(endpoint),
            self.endpoint_kind(endpoint),
            params.name,
        ));
        out.push_str(&format!("Path Group: {}\n", params.name));
        out.push_str("Path Type: max\n\n");

        let mut rows: Vec<[String; 3]> = Vec::new();
        rows.push(row(
            "clock CLKM (rise edge)",
            params.rise_edge,
            params.rise_edge,
        ));
        rows.push(row(
            "clock network delay (ideal)",
            params.network_delay,
            params.network_delay,
        ));

        // Data section: the cumulative tracks propagation stages only.
        let mut cumulative = 0.0;
        for stage in delays
            .stages
            .iter()
            .filter(|s| s.kind != StageKind::Constraint)
        {
            let label = match stage.kind {
                StageKind::ClockToQ => format!("{}/Clk2Q", self.node_name(stage.node)),
                _ => format!(
                    "{}/{}",
                    self.node_name(stage.node),
                    self.node_cell_name(stage.node),
                ),
            };
            cumulative += stage.delay;
            rows.push([
                label,
                format!("{:.4}", stage.delay),
                format!("{cumulative:.4}"),
            ]);
        }
        let arrival = cumulative;
        rows.push(["data arrival time".to_string(), String::new(), format!("{arrival:.4}")]);

        // Required-time derivation.
        rows.push(row("clock period (rise edge)", params.period, params.period));
        let mut required = params.period - params.network_delay;
        rows.push([
            "clock network delay (ideal)".to_string(),
            format!("{:.4}", params.network_delay),
            format!("{required:.4}"),
        ]);
        required -= params.uncertainty;
        rows.push([
            "clock uncertainty".to_string(),
            format!("{:.4}", -params.uncertainty),
            format!("{required:.4}"),
        ]);
        if let Some(setup) = delays.constraint() {
            required -= setup;
            rows.push([
                "setup_time".to_string(),
                format!("{:.4}", -setup),
                format!("{required:.4}"),
            ]);
        }

        rows.push(separator_row());
        rows.push([
            "data required time".to_string(),
            String::new(),
            format!("{required:.4}"),
        ]);
        rows.push([
            "data arrival time".to_string(),
            String::new(),
            format!("{:.4}", -arrival),
        ]);
        rows.push(separator_row());

        let slack = required - arrival;
        let status = if slack >= 0.0 { "MET" } else { "VIOLATE" };
        rows.push([
            format!("slack ({status})"),
            String::new(),
            format!("{slack:.4}"),
        ]);

        out.push_str(&format_table(&rows));
    }

    fn node_name(&self, node: NodeId) -> &str {
        self.interner.resolve(self.graph.node(node).name)
    }

    fn node_cell_name(&self, node: NodeId) -> &str {
        match self.graph.node(node).kind {
            NodeKind::Instance { cell } => self.interner.resolve(cell),
            _ => "",
        }
    }

    fn endpoint_kind(&self, node: NodeId) -> &'static str {
        match self.graph.node(node).kind {
            NodeKind::PrimaryInput => "input port",
            NodeKind::PrimaryOutput => "output port",
            NodeKind::Instance { .. } => "rising edge-triggered flip-flop",
        }
    }
}

/// Computes the required time per the slack law:
/// `period - network_delay - uncertainty - setup_time`.
fn required_time(delays: &PathDelays, params: &ClockParams) -> f64 {
    params.period - params.network_delay - params.uncertainty
        - delays.constraint().unwrap_or(0.0)
}

fn row(point: &str, incr: f64, path: f64) -> [String; 3] {
    [point.to_string(), format!("{incr:.4}"), format!("{path:.4}")]
}

fn separator_row() -> [String; 3] {
    [
        "----------------------------".to_string(),
        "-------".to_string(),
        "--------".to_string(),
    ]
}

/// Formats rows into the three-column `{Point, Incr, Path}` layout:
/// left-aligned point column, right-aligned value columns, two spaces
/// between columns, dashed underline after the header.
fn format_table(rows: &[[String; 3]]) -> String {
    const HEADERS: [&str; 3] = ["Point", "Incr", "Path"];

    let mut widths = [HEADERS[0].len(), HEADERS[1].len(), HEADERS[2].len()];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<w0$}  {:>w1$}  {:>w2$}\n",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    ));
    out.push_str(&format!(
        "{}  {}  {}\n",
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2]),
    ));
    for row in rows {
        let line = format!(
            "{:<w0$}  {:>w1$}  {:>w2$}",
            row[0],
            row[1],
            row[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::StageDelay;
    use crate::paths::PathClass;
    use kronos_common::Ident;

    fn fixture() -> (NetlistGraph, Interner) {
        let interner = Interner::new();
        let mut graph = NetlistGraph::new();
        let dfrtp = interner.get_or_intern("DFRTP");
        let and2 = interner.get_or_intern("AND2");
        graph.add_node(
            interner.get_or_intern("ff1"),
            NodeKind::Instance { cell: dfrtp },
        );
        graph.add_node(
            interner.get_or_intern("g1"),
            NodeKind::Instance { cell: and2 },
        );
        graph.add_node(
            interner.get_or_intern("ff2"),
            NodeKind::Instance { cell: dfrtp },
        );
        (graph, interner)
    }

    fn sample_path(interner: &Interner) -> TimingPath {
        let d: Option<Ident> = Some(interner.get_or_intern("D"));
        let a = Some(interner.get_or_intern("A"));
        TimingPath {
            class: PathClass::RegToReg,
            nodes: vec![
                NodeId::new(0),
                NodeId::new(1),
                NodeId::new(2),
            ],
            attrs: vec![a, d],
        }
    }

    fn sample_delays() -> PathDelays {
        PathDelays {
            stages: vec![
                StageDelay {
                    node: NodeId::new(0),
                    kind: StageKind::ClockToQ,
                    delay: 0.3,
                },
                StageDelay {
                    node: NodeId::new(1),
                    kind: StageKind::Combinational,
                    delay: 0.2,
                },
                StageDelay {
                    node: NodeId::new(2),
                    kind: StageKind::Constraint,
                    delay: 0.1,
                },
            ],
        }
    }

    fn params() -> ClockParams {
        ClockParams {
            name: "core_clock".to_string(),
            rise_edge: 0.0,
            network_delay: 0.0,
            uncertainty: 0.25,
            period: 1.8,
        }
    }

    #[test]
    fn block_contains_required_rows_in_order() {
        let (graph, interner) = fixture();
        let reporter = TimingReporter::new(&graph, &interner);
        let text = reporter.render_text(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &params(),
        );

        let expected_order = [
            "Startpoint: ff1",
            "Endpoint: ff2",
            "Path Group: core_clock",
            "Path Type: max",
            "clock CLKM (rise edge)",
            "clock network delay (ideal)",
            "ff1/Clk2Q",
            "g1/AND2",
            "data arrival time",
            "clock period (rise edge)",
            "clock uncertainty",
            "setup_time",
            "data required time",
            "slack (",
        ];
        let mut cursor = 0;
        for marker in expected_order {
            let found = text[cursor..]
                .find(marker)
                .unwrap_or_else(|| panic!("missing `{marker}` after byte {cursor}"));
            cursor += found;
        }
    }

    #[test]
    fn slack_arithmetic() {
        let (graph, interner) = fixture();
        let reporter = TimingReporter::new(&graph, &interner);
        let summaries = reporter.summarize(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &params(),
        );
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        // arrival = 0.3 + 0.2; required = 1.8 - 0.0 - 0.25 - 0.1
        assert!((summary.arrival - 0.5).abs() < 1e-12);
        assert!((summary.required - 1.45).abs() < 1e-12);
        assert!((summary.slack - 0.95).abs() < 1e-12);
        assert!(summary.met);
    }

    #[test]
    fn violated_path_reports_violate() {
        let (graph, interner) = fixture();
        let reporter = TimingReporter::new(&graph, &interner);
        let mut tight = params();
        tight.period = 0.5;
        let text = reporter.render_text(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &tight,
        );
        assert!(text.contains("slack (VIOLATE)"));

        let summaries = reporter.summarize(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &tight,
        );
        assert!(!summaries[0].met);
        assert!(summaries[0].slack < 0.0);
    }

    #[test]
    fn arrival_row_negated_in_summary_section() {
        let (graph, interner) = fixture();
        let reporter = TimingReporter::new(&graph, &interner);
        let text = reporter.render_text(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &params(),
        );
        // The summary section shows the negated arrival.
        assert!(text.contains("-0.5000"));
    }

    #[test]
    fn paths_without_delay_maps_skipped() {
        let (graph, interner) = fixture();
        let reporter = TimingReporter::new(&graph, &interner);
        let text = reporter.render_text(&[sample_path(&interner)], &[None], &params());
        assert!(text.is_empty());
        let summaries = reporter.summarize(&[sample_path(&interner)], &[None], &params());
        assert!(summaries.is_empty());
    }

    #[test]
    fn csv_layout() {
        let (graph, interner) = fixture();
        let reporter = TimingReporter::new(&graph, &interner);
        let summaries = reporter.summarize(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &params(),
        );
        let csv = reporter.render_csv(&summaries);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("path_id,startpoint,endpoint,arrival,required,slack,status")
        );
        assert_eq!(
            lines.next(),
            Some("path1,ff1,ff2,0.500000,1.450000,0.950000,MET")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn deterministic_rendering() {
        let (graph, interner) = fixture();
        let reporter = TimingReporter::new(&graph, &interner);
        let a = reporter.render_text(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &params(),
        );
        let b = reporter.render_text(
            &[sample_path(&interner)],
            &[Some(sample_delays())],
            &params(),
        );
        assert_eq!(a, b);
    }
}
