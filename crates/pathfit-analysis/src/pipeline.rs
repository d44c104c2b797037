//! Per-run analysis pipeline
//!
//! For every run: summarize the sample, fit each configured family, pick the
//! lowest-AICc family and bootstrap its threshold probability. Runs are
//! processed in ascending identifier order with one shared generator, so a
//! seeded generator reproduces the whole analysis.
//!
//! Failures stay local to their run: a family that cannot be fitted is
//! recorded in [`RunAnalysis::fits`], and a failed bootstrap is recorded in
//! [`RunAnalysis::bootstrap`] while the run's fits remain available.

use std::collections::BTreeMap;

use pathfit_stats::descriptive::DescriptiveStats;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    bootstrap::{self, BootstrapConfig, BootstrapError, BootstrapResult},
    family::Family,
    ranking::{self, FamilyFit},
};

pub const DEFAULT_THRESHOLD: f64 = 7542.0;

/// Analysis settings threaded through every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Distance at which fitted CDFs are evaluated
    pub threshold: f64,
    /// Families to fit, in tie-break order
    pub families: Vec<Family>,
    pub bootstrap: BootstrapConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            families: Family::ALL.to_vec(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("threshold must be finite, got {threshold}")]
    NonFiniteThreshold { threshold: f64 },
    #[display("at least one distribution family is required")]
    NoFamilies,
    #[display("distribution family {family} is listed more than once")]
    DuplicateFamily { family: Family },
    #[display("bootstrap needs at least one resample")]
    NoResamples,
    #[display("confidence level must be between 0 and 1, got {confidence}")]
    InvalidConfidence { confidence: f64 },
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::NonFiniteThreshold {
                threshold: self.threshold,
            });
        }
        if self.families.is_empty() {
            return Err(ConfigError::NoFamilies);
        }
        for (i, family) in self.families.iter().enumerate() {
            if self.families[..i].contains(family) {
                return Err(ConfigError::DuplicateFamily { family: *family });
            }
        }
        if self.bootstrap.resamples == 0 {
            return Err(ConfigError::NoResamples);
        }
        let confidence = self.bootstrap.confidence;
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(ConfigError::InvalidConfidence { confidence });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum BootstrapOutcome {
    Estimated(BootstrapResult),
    Failed(BootstrapError),
    /// No family could be fitted, so there is nothing to bootstrap
    NoUsableFamily,
}

/// Everything computed for one run.
#[derive(Debug, Clone)]
pub struct RunAnalysis {
    pub run: u32,
    pub sample: Vec<f64>,
    /// `None` for an empty sample
    pub summary: Option<DescriptiveStats>,
    /// One entry per configured family, in configured order
    pub fits: Vec<FamilyFit>,
    pub best_family: Option<Family>,
    pub bootstrap: BootstrapOutcome,
}

/// Analyzes one run's sample.
pub fn analyze_run<R>(
    run: u32,
    sample: &[f64],
    config: &AnalysisConfig,
    rng: &mut R,
) -> RunAnalysis
where
    R: Rng + ?Sized,
{
    let fits = ranking::fit_families(sample, &config.families, config.threshold);
    let best_family = ranking::best_by_aicc(&fits).map(|best| best.family);
    let bootstrap = match best_family {
        Some(family) => match bootstrap::estimate(
            sample,
            family,
            config.threshold,
            &config.bootstrap,
            rng,
        ) {
            Ok(result) => BootstrapOutcome::Estimated(result),
            Err(err) => BootstrapOutcome::Failed(err),
        },
        None => BootstrapOutcome::NoUsableFamily,
    };

    RunAnalysis {
        run,
        sample: sample.to_vec(),
        summary: DescriptiveStats::new(sample.iter().copied()),
        fits,
        best_family,
        bootstrap,
    }
}

/// Analyzes every run in ascending run order.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use pathfit_analysis::{
///     bootstrap::BootstrapConfig,
///     pipeline::{AnalysisConfig, BootstrapOutcome, analyze_runs},
/// };
/// use rand::SeedableRng;
///
/// let samples = BTreeMap::from([
///     (1, vec![7480.0, 7530.0, 7555.0, 7610.0, 7502.0, 7588.0, 7521.0, 7466.0, 7634.0]),
///     (2, vec![]),
/// ]);
/// let config = AnalysisConfig {
///     bootstrap: BootstrapConfig { resamples: 100, ..BootstrapConfig::default() },
///     ..AnalysisConfig::default()
/// };
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let analyses = analyze_runs(&samples, &config, &mut rng);
///
/// assert!(matches!(analyses[&1].bootstrap, BootstrapOutcome::Estimated(_)));
/// assert!(matches!(analyses[&2].bootstrap, BootstrapOutcome::NoUsableFamily));
/// ```
pub fn analyze_runs<R>(
    samples: &BTreeMap<u32, Vec<f64>>,
    config: &AnalysisConfig,
    rng: &mut R,
) -> BTreeMap<u32, RunAnalysis>
where
    R: Rng + ?Sized,
{
    samples
        .iter()
        .map(|(run, sample)| (*run, analyze_run(*run, sample, config, rng)))
        .collect()
}
