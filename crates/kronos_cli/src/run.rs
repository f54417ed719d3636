//! Run execution: input loading, analysis, and report persistence.

use crate::Cli;
use chrono::Local;
use kronos_common::{Interner, StaError, StaResult};
use kronos_diagnostics::{DiagnosticSink, LogRenderer};
use kronos_liberty::parse_library;
use kronos_netlist::parse_netlist;
use kronos_sta::{run_sta, CancelToken, StaReport, SubstringClassifier};
use std::fs;
use std::path::{Path, PathBuf};

/// The outcome of a successful run, for the stdout summary.
#[derive(Debug)]
pub struct RunOutcome {
    /// The directory reports were written into.
    pub run_dir: PathBuf,
    /// The analysis report.
    pub report: StaReport,
}

impl RunOutcome {
    /// One-line result summary printed to stdout.
    pub fn summary_line(&self) -> String {
        match self.report.worst_slack {
            Some(worst) => format!(
                "{} paths analyzed, {} setup violations, worst slack {:.4}",
                self.report.summaries.len(),
                self.report.violation_count,
                worst
            ),
            None => "no reportable paths found".to_string(),
        }
    }
}

/// Executes the analysis described by the CLI arguments.
pub fn run(cli: &Cli) -> StaResult<RunOutcome> {
    require_exists(&cli.library)?;
    require_exists(&cli.design)?;
    require_exists(&cli.sdc)?;

    let library_text = fs::read_to_string(&cli.library)?;
    let design_text = fs::read_to_string(&cli.design)?;
    let sdc_text = fs::read_to_string(&cli.sdc)?;

    let interner = Interner::new();
    let sink = DiagnosticSink::new();

    let library = parse_library(
        &library_text,
        &cli.library.display().to_string(),
        &interner,
        &sink,
    )?;
    let netlist = parse_netlist(
        &design_text,
        &cli.design.display().to_string(),
        &interner,
        &sink,
    )?;
    let constraints = kronos_sta::parse_sdc(
        &sdc_text,
        &cli.sdc.display().to_string(),
        &interner,
        &sink,
    );

    let classifier = load_classifier(cli)?;

    let token = CancelToken::new();
    let Some(report) = run_sta(
        &netlist,
        &library,
        &constraints,
        &classifier,
        &interner,
        &sink,
        &token,
    )?
    else {
        // The token is local and never cancelled, so this is unreachable in
        // practice; surface it as an error rather than panicking.
        return Err(StaError::InvalidInput("analysis was cancelled".to_string()));
    };

    let timestamp = Local::now().format("%Y_%m_%d_%H_%M_%S").to_string();
    let run_dir = cli
        .run_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("sta_run_{timestamp}")));
    fs::create_dir_all(&run_dir)?;

    fs::write(run_dir.join("report_sta.txt"), &report.text)?;
    fs::write(run_dir.join("final_report_sta.csv"), &report.csv)?;
    fs::write(
        run_dir.join(format!("{timestamp}.log")),
        render_log(cli, library.cell_count(), &report, &sink),
    )?;

    Ok(RunOutcome { run_dir, report })
}

fn require_exists(path: &Path) -> StaResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(StaError::InputNotFound(path.display().to_string()))
    }
}

/// Picks the sequential-cell classifier: an explicit `--ff_names` file, an
/// `ff_names.txt` next to the design, or the built-in default list.
fn load_classifier(cli: &Cli) -> StaResult<SubstringClassifier> {
    if let Some(path) = &cli.ff_names {
        require_exists(path)?;
        return SubstringClassifier::from_file(path);
    }
    let beside_design = cli
        .design
        .parent()
        .map(|dir| dir.join("ff_names.txt"))
        .filter(|p| p.exists());
    match beside_design {
        Some(path) => SubstringClassifier::from_file(&path),
        None => Ok(SubstringClassifier::default_patterns()),
    }
}

/// Renders the run log: inputs, result summary, then all diagnostics in
/// emission order.
fn render_log(cli: &Cli, cell_count: usize, report: &StaReport, sink: &DiagnosticSink) -> String {
    let mut log = String::new();
    log.push_str(&format!("library: {}\n", cli.library.display()));
    log.push_str(&format!("design: {}\n", cli.design.display()));
    log.push_str(&format!("sdc: {}\n", cli.sdc.display()));
    log.push_str(&format!("library cells: {cell_count}\n"));
    log.push_str(&format!("paths enumerated: {}\n", report.path_count));
    log.push_str(&format!("paths reported: {}\n", report.summaries.len()));
    log.push_str(&format!("setup violations: {}\n", report.violation_count));
    if let Some(worst) = report.worst_slack {
        log.push_str(&format!("worst slack: {worst:.6}\n"));
    }
    let counts = sink.severity_counts();
    log.push_str(&format!(
        "diagnostics: {} errors, {} warnings, {} notes\n",
        counts.errors, counts.warnings, counts.notes
    ));
    log.push('\n');
    log.push_str(&LogRenderer::new().render_all(&sink.diagnostics()));
    log
}
