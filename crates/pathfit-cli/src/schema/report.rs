use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pathfit_analysis::{
    bootstrap::IntervalEstimate,
    family::Family,
    fit::FitResult,
    pipeline::{AnalysisConfig, BootstrapOutcome, RunAnalysis},
    ranking::FamilyFit,
    summary::RunRanking,
};
use pathfit_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::util;

/// Terminal distances extracted from a log directory
#[derive(Debug, Clone, Serialize)]
pub struct SamplesReport {
    pub generated_at: DateTime<Utc>,
    pub log_dir: String,
    pub runs: BTreeMap<u32, RunSampleRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSampleRecord {
    /// Terminal distance of each iteration, in iteration order
    pub sample: Vec<f64>,
    /// Iterations whose log holds no record
    pub empty_iterations: Vec<u32>,
}

/// Result of the `analyze` command.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was created (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    pub log_dir: String,
    /// Seed the bootstrap generator was started from
    pub seed: u64,
    /// Effective configuration after applying overrides
    pub config: AnalysisConfig,
    pub ranking: RunRanking,
    pub runs: Vec<RunRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run: u32,
    pub sample: Vec<f64>,
    pub empty_iterations: Vec<u32>,
    pub summary: Option<DescriptiveStats>,
    pub fits: Vec<FitRecord>,
    /// Family with the lowest AICc
    pub best_family: Option<Family>,
    pub bootstrap: BootstrapRecord,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitRecord {
    Fitted(FitResult),
    Failed { family: Family, error: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BootstrapRecord {
    Estimated {
        family: Family,
        threshold: f64,
        confidence: f64,
        independent_runs: u32,
        resamples: usize,
        single_run: IntervalEstimate,
        any_run: IntervalEstimate,
        #[serde(skip_serializing_if = "Option::is_none")]
        replicates: Option<Replicates>,
    },
    Failed {
        error: String,
    },
    NoUsableFamily,
}

/// Per-replicate probabilities
#[derive(Debug, Clone, Serialize)]
pub struct Replicates {
    pub single_run: Vec<f64>,
    pub any_run: Vec<f64>,
}

impl RunRecord {
    pub fn new(
        analysis: RunAnalysis,
        empty_iterations: Vec<u32>,
        include_replicates: bool,
    ) -> Self {
        let RunAnalysis {
            run,
            sample,
            summary,
            fits,
            best_family,
            bootstrap,
        } = analysis;
        Self {
            run,
            sample,
            empty_iterations,
            summary,
            fits: fits.into_iter().map(FitRecord::from).collect(),
            best_family,
            bootstrap: BootstrapRecord::new(bootstrap, include_replicates),
        }
    }
}

impl From<FamilyFit> for FitRecord {
    fn from(fit: FamilyFit) -> Self {
        match fit.outcome {
            Ok(result) => FitRecord::Fitted(result),
            Err(err) => FitRecord::Failed {
                family: fit.family,
                error: err.to_string(),
            },
        }
    }
}

impl BootstrapRecord {
    pub fn new(outcome: BootstrapOutcome, include_replicates: bool) -> Self {
        match outcome {
            BootstrapOutcome::Estimated(result) => BootstrapRecord::Estimated {
                family: result.family,
                threshold: result.threshold,
                confidence: result.confidence,
                independent_runs: result.independent_runs,
                resamples: result.probabilities.len(),
                single_run: result.single_run,
                any_run: result.any_run,
                replicates: include_replicates.then(|| Replicates {
                    single_run: result.probabilities,
                    any_run: result.any_run_probabilities,
                }),
            },
            BootstrapOutcome::Failed(err) => BootstrapRecord::Failed {
                error: util::error_chain(&err),
            },
            BootstrapOutcome::NoUsableFamily => BootstrapRecord::NoUsableFamily,
        }
    }
}

#[cfg(test)]
mod tests {
    use pathfit_analysis::pipeline::analyze_run;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn config() -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.bootstrap.resamples = 30;
        config
    }

    #[test]
    fn test_run_record_serialization() {
        let sample = [
            7410.0, 7520.0, 7480.0, 7600.0, 7555.0, 7390.0, 7630.0, 7505.0, 7470.0, 7580.0,
        ];
        let mut rng = Pcg64::seed_from_u64(1);
        let analysis = analyze_run(3, &sample, &config(), &mut rng);
        let record = RunRecord::new(analysis, vec![], false);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["run"], 3);
        assert_eq!(json["fits"].as_array().unwrap().len(), 4);
        assert_eq!(json["fits"][0]["status"], "fitted");
        assert_eq!(json["fits"][0]["family"], "norm");
        assert_eq!(json["bootstrap"]["status"], "estimated");
        assert_eq!(json["bootstrap"]["resamples"], 30);
        assert!(json["bootstrap"].get("replicates").is_none());
    }

    #[test]
    fn test_replicates_are_opt_in() {
        let sample = [
            7410.0, 7520.0, 7480.0, 7600.0, 7555.0, 7390.0, 7630.0, 7505.0, 7470.0, 7580.0,
        ];
        let mut rng = Pcg64::seed_from_u64(2);
        let analysis = analyze_run(1, &sample, &config(), &mut rng);
        let record = RunRecord::new(analysis, vec![], true);
        let json = serde_json::to_value(&record).unwrap();

        let replicates = &json["bootstrap"]["replicates"];
        assert_eq!(replicates["single_run"].as_array().unwrap().len(), 30);
        assert_eq!(replicates["any_run"].as_array().unwrap().len(), 30);
    }

    #[test]
    fn test_failed_fits_are_reported_as_errors() {
        let mut rng = Pcg64::seed_from_u64(3);
        let analysis = analyze_run(2, &[5.0], &config(), &mut rng);
        let record = RunRecord::new(analysis, vec![4], false);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["fits"][0]["status"], "failed");
        assert!(
            json["fits"][0]["error"]
                .as_str()
                .unwrap()
                .contains("at least 2 values")
        );
        assert_eq!(json["bootstrap"]["status"], "no_usable_family");
        assert_eq!(json["empty_iterations"][0], 4);
    }
}
