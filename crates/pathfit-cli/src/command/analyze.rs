use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use pathfit_analysis::summary;

use crate::{
    command::{AnalysisArg, AnalysisSession},
    schema::report::{AnalysisReport, RunRecord},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    pub analysis: AnalysisArg,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Include every bootstrap replicate's probabilities in the output
    #[arg(long)]
    pub include_replicates: bool,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let session = AnalysisSession::run(&arg.analysis)?;
    let report = build_report(session, &arg.analysis, arg.include_replicates);
    Output::save_json(&report, arg.output.clone())
}

fn build_report(
    session: AnalysisSession,
    arg: &AnalysisArg,
    include_replicates: bool,
) -> AnalysisReport {
    let summaries = summary::summarize_runs(&session.collection.samples());
    let ranking = summary::rank_runs(&summaries);

    let runs = session
        .analyses
        .values()
        .map(|analysis| {
            let empty_iterations = session.empty_iterations(analysis.run);
            RunRecord::new(analysis.clone(), empty_iterations, include_replicates)
        })
        .collect();

    AnalysisReport {
        generated_at: Utc::now(),
        log_dir: arg.log_dir.display().to_string(),
        seed: session.seed,
        config: session.settings.analysis,
        ranking,
        runs,
    }
}
