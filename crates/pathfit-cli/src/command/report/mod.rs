//! Text report command
//!
//! Prints run statistics, run rankings, per-family fit metrics and
//! bootstrap confidence intervals as tables, and optionally writes Q-Q
//! plot data for every fitted family as CSV.

mod qq;
mod table;

use std::path::PathBuf;

use clap::Args;
use pathfit_analysis::summary;

use crate::command::{AnalysisArg, AnalysisSession};

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    #[clap(flatten)]
    pub analysis: AnalysisArg,

    /// Output directory for Q-Q plot CSV files
    #[arg(long)]
    pub qq_output_dir: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let session = AnalysisSession::run(&arg.analysis)?;
    let config = &session.settings.analysis;

    println!("Terminal Distance Report");
    println!("========================\n");
    table::print_settings(config, session.seed);
    println!();

    let summaries = summary::summarize_runs(&session.collection.samples());
    println!("Run Statistics:");
    table::print_run_statistics(&summaries);
    println!();

    println!("Run Ranking (lower is better):");
    table::print_run_ranking(&summary::rank_runs(&summaries));
    println!();

    for analysis in session.analyses.values() {
        table::print_fit_metrics(analysis, config.threshold);
        println!();
    }

    println!(
        "Bootstrap Confidence Intervals ({:.0}%, {} independent runs):",
        config.bootstrap.confidence * 100.0,
        config.bootstrap.independent_runs
    );
    table::print_bootstrap_intervals(session.analyses.values());

    if let Some(dir) = &arg.qq_output_dir {
        println!();
        for analysis in session.analyses.values() {
            qq::save_run_qq_data(dir, analysis)?;
        }
    }

    Ok(())
}
