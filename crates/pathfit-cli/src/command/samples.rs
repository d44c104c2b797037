use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use crate::{
    schema::report::{RunSampleRecord, SamplesReport},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SamplesArg {
    /// Directory containing `log_<run>_<iteration>.log` files
    pub log_dir: PathBuf,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SamplesArg) -> anyhow::Result<()> {
    let collection = util::collect_runs(&arg.log_dir)?;

    let runs = collection
        .runs()
        .iter()
        .map(|(run, series)| {
            let record = RunSampleRecord {
                sample: series.terminal_distances(),
                empty_iterations: series.empty_iterations(),
            };
            (*run, record)
        })
        .collect();
    let report = SamplesReport {
        generated_at: Utc::now(),
        log_dir: arg.log_dir.display().to_string(),
        runs,
    };

    Output::save_json(&report, arg.output.clone())
}
