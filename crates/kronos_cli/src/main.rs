//! Kronos CLI — the command-line entry point for static timing analysis.
//!
//! Reads a Liberty library, a gate-level netlist, and an SDC constraint
//! file, runs the analysis, and persists the reports and the run log into
//! a (by default timestamped) run directory.

#![warn(missing_docs)]

mod run;

use std::path::PathBuf;
use std::process;

use clap::Parser;

/// Kronos — static timing analysis for synthesized netlists.
#[derive(Parser, Debug)]
#[command(name = "kronos", version, about = "Kronos static timing analyzer")]
pub struct Cli {
    /// Path to the Liberty standard-cell library.
    #[arg(long)]
    pub library: PathBuf,

    /// Path to the gate-level netlist.
    #[arg(long)]
    pub design: PathBuf,

    /// Path to the SDC constraints file.
    #[arg(long)]
    pub sdc: PathBuf,

    /// Output directory for reports and the run log. Defaults to a
    /// timestamped `sta_run_YYYY_MM_DD_HH_MM_SS` subdirectory of the
    /// current directory.
    #[arg(long = "run_dir")]
    pub run_dir: Option<PathBuf>,

    /// Sequential-cell name list (one substring per line). Defaults to an
    /// `ff_names.txt` next to the design, falling back to a built-in list.
    #[arg(long = "ff_names")]
    pub ff_names: Option<PathBuf>,

    /// Suppress the stdout summary.
    #[arg(short, long)]
    pub quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    match run::run(&cli) {
        Ok(outcome) => {
            if !cli.quiet {
                println!("{}", outcome.summary_line());
                println!("reports written to {}", outcome.run_dir.display());
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
