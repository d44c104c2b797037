use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pathfit_analysis::{
    family::Family,
    pipeline::{self, BootstrapOutcome, RunAnalysis},
};
use pathfit_logs::collect::{RunCollection, RunSeries};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use self::{analyze::AnalyzeArg, report::ReportArg, samples::SamplesArg};
use crate::{schema::config::AnalysisSettings, util};

mod analyze;
mod report;
mod samples;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Extract per-run terminal distance samples from a log directory
    Samples(#[clap(flatten)] SamplesArg),
    /// Fit distributions and bootstrap threshold probabilities (JSON output)
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Print statistics, fit metrics and confidence interval tables
    Report(#[clap(flatten)] ReportArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Samples(arg) => samples::run(&arg)?,
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Report(arg) => report::run(&arg)?,
    }
    Ok(())
}

/// Options shared by the commands that fit distributions.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct AnalysisArg {
    /// Directory containing `log_<run>_<iteration>.log` files
    pub log_dir: PathBuf,

    /// JSON file with analysis settings; options below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Distance threshold at which fitted CDFs are evaluated [default: 7542]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Distribution families to fit (comma-separated) [default: all]
    #[arg(long, value_delimiter = ',', ignore_case = true)]
    pub families: Option<Vec<FamilyArg>>,

    /// Number of bootstrap resamples [default: 10000]
    #[arg(long)]
    pub resamples: Option<usize>,

    /// Number of independent runs for the "at least one run" probability [default: 10]
    #[arg(long)]
    pub independent_runs: Option<u32>,

    /// Confidence level of bootstrap intervals [default: 0.95]
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Random seed for bootstrap resampling [default: random]
    #[arg(long)]
    pub seed: Option<u64>,
}

impl AnalysisArg {
    /// Resolves settings from the config file and command-line overrides.
    pub(crate) fn settings(&self) -> anyhow::Result<AnalysisSettings> {
        let mut settings = match &self.config {
            Some(path) => util::read_json_file("config", path)?,
            None => AnalysisSettings::default(),
        };

        let analysis = &mut settings.analysis;
        if let Some(threshold) = self.threshold {
            analysis.threshold = threshold;
        }
        if let Some(families) = &self.families {
            analysis.families = families.iter().copied().map(Family::from).collect();
        }
        if let Some(resamples) = self.resamples {
            analysis.bootstrap.resamples = resamples;
        }
        if let Some(independent_runs) = self.independent_runs {
            analysis.bootstrap.independent_runs = independent_runs;
        }
        if let Some(confidence) = self.confidence {
            analysis.bootstrap.confidence = confidence;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }

        settings
            .analysis
            .validate()
            .context("Invalid analysis configuration")?;
        Ok(settings)
    }
}

/// Distribution family names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FamilyArg {
    #[value(name = "norm", alias = "normal")]
    Normal,
    #[value(name = "lognorm", aliases = ["lognormal", "log-normal"])]
    LogNormal,
    #[value(name = "gamma")]
    Gamma,
    #[value(name = "weibull_min", aliases = ["weibull", "weibull-min"])]
    WeibullMin,
}

impl From<FamilyArg> for Family {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Normal => Family::Normal,
            FamilyArg::LogNormal => Family::LogNormal,
            FamilyArg::Gamma => Family::Gamma,
            FamilyArg::WeibullMin => Family::WeibullMin,
        }
    }
}

/// Seeds the bootstrap generator, drawing a fresh seed if none is configured.
pub(crate) fn seeded_rng(seed: Option<u64>) -> (u64, Pcg64) {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Using random seed {seed}");
    (seed, Pcg64::seed_from_u64(seed))
}

/// Logs, settings and per-run results shared by `analyze` and `report`.
#[derive(Debug)]
pub(crate) struct AnalysisSession {
    pub settings: AnalysisSettings,
    pub seed: u64,
    pub collection: RunCollection,
    pub analyses: BTreeMap<u32, RunAnalysis>,
}

impl AnalysisSession {
    pub(crate) fn run(arg: &AnalysisArg) -> anyhow::Result<Self> {
        let settings = arg.settings()?;
        let collection = util::collect_runs(&arg.log_dir)?;
        let (seed, mut rng) = seeded_rng(settings.seed);

        let samples = collection.samples();
        let config = &settings.analysis;
        eprintln!(
            "Fitting {} families to {} run(s) with {} bootstrap resamples...",
            config.families.len(),
            samples.len(),
            config.bootstrap.resamples
        );
        let analyses = pipeline::analyze_runs(&samples, config, &mut rng);
        for analysis in analyses.values() {
            log_diagnostics(analysis);
        }

        Ok(Self {
            settings,
            seed,
            collection,
            analyses,
        })
    }

    pub(crate) fn empty_iterations(&self, run: u32) -> Vec<u32> {
        self.collection
            .get(run)
            .map(RunSeries::empty_iterations)
            .unwrap_or_default()
    }
}

fn log_diagnostics(analysis: &RunAnalysis) {
    let run = analysis.run;
    for fit in &analysis.fits {
        if let Err(err) = &fit.outcome {
            eprintln!("Warning: run {run}: {err}");
        }
    }
    match &analysis.bootstrap {
        BootstrapOutcome::Estimated(_) => {}
        BootstrapOutcome::Failed(err) => {
            eprintln!("Warning: run {run}: {}", util::error_chain(err));
        }
        BootstrapOutcome::NoUsableFamily => {
            eprintln!("Warning: run {run}: no family could be fitted, bootstrap skipped");
        }
    }
}
