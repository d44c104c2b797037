//! Bootstrap confidence intervals for threshold probabilities
//!
//! The estimator quantifies how much the fitted probability of reaching the
//! distance threshold would vary across samples of the same size:
//!
//! 1. Draw `n` values with replacement from the original sample
//! 2. Refit the chosen family to the resample
//! 3. Record the refit's CDF at the threshold
//!
//! After `resamples` replicates the recorded probabilities give the point
//! estimate (mean) and a percentile interval. Each probability `p` is also
//! turned into `1 - (1 - p)^r`, the chance that at least one of `r`
//! independent runs reaches the threshold, and summarized the same way.
//!
//! A single failed refit fails the whole estimate.

use pathfit_stats::percentiles::compute_percentiles;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    family::Family,
    fit::{FitError, fit_distribution, threshold_probability},
};

pub const DEFAULT_RESAMPLES: usize = 10_000;
pub const DEFAULT_INDEPENDENT_RUNS: u32 = 10;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Bootstrap configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Number of resampled refits
    pub resamples: usize,
    /// Number of independent runs for the "at least one run" probability
    pub independent_runs: u32,
    /// Confidence level of the percentile interval
    pub confidence: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resamples: DEFAULT_RESAMPLES,
            independent_runs: DEFAULT_INDEPENDENT_RUNS,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Errors that can occur during bootstrap
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum BootstrapError {
    #[display("bootstrap needs at least one resample")]
    NoResamples,
    #[display("invalid confidence level {confidence} (must be between 0 and 1)")]
    InvalidConfidence { confidence: f64 },
    #[display("refit of bootstrap replicate {replicate} failed")]
    ResampleFit { replicate: usize, source: FitError },
}

/// Mean and percentile interval of a bootstrap distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalEstimate {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IntervalEstimate {
    /// Summarizes `values` with the central `confidence` percentile interval.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_values(values: &[f64], confidence: f64) -> Self {
        let tail = (1.0 - confidence) / 2.0 * 100.0;
        let bounds = compute_percentiles(values, &[tail, 100.0 - tail]);
        Self {
            mean: values.iter().sum::<f64>() / values.len() as f64,
            lower: bounds[0],
            upper: bounds[1],
        }
    }
}

/// Result of bootstrap analysis
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapResult {
    pub family: Family,
    pub threshold: f64,
    pub confidence: f64,
    pub independent_runs: u32,
    /// Threshold probability of every replicate, in draw order
    pub probabilities: Vec<f64>,
    /// `1 - (1 - p)^independent_runs` of every replicate
    pub any_run_probabilities: Vec<f64>,
    /// Probability that a single run reaches the threshold
    pub single_run: IntervalEstimate,
    /// Probability that at least one of `independent_runs` runs reaches it
    pub any_run: IntervalEstimate,
}

/// Probability that at least one of `runs` independent runs succeeds, given a
/// per-run success probability `p`.
///
/// # Examples
///
/// ```
/// use pathfit_analysis::bootstrap::probability_any;
///
/// assert_eq!(probability_any(0.25, 1), 0.25);
/// assert!((probability_any(0.5, 2) - 0.75).abs() < 1e-12);
/// ```
#[must_use]
pub fn probability_any(p: f64, runs: u32) -> f64 {
    1.0 - (1.0 - p).powf(f64::from(runs))
}

/// Runs the bootstrap for `family` on `sample`.
///
/// All draws come from `rng`, so a seeded generator gives reproducible
/// results. The resample buffer is allocated once and reused for every
/// replicate.
///
/// # Errors
///
/// Returns [`BootstrapError::ResampleFit`] as soon as one replicate cannot be
/// fitted or yields a non-finite threshold probability, and rejects configurations without resamples or with a confidence
/// level outside `(0, 1)`.
pub fn estimate<R>(
    sample: &[f64],
    family: Family,
    threshold: f64,
    config: &BootstrapConfig,
    rng: &mut R,
) -> Result<BootstrapResult, BootstrapError>
where
    R: Rng + ?Sized,
{
    if config.resamples == 0 {
        return Err(BootstrapError::NoResamples);
    }
    if !(config.confidence > 0.0 && config.confidence < 1.0) {
        return Err(BootstrapError::InvalidConfidence {
            confidence: config.confidence,
        });
    }

    let mut resample = vec![0.0; sample.len()];
    let mut probabilities = Vec::with_capacity(config.resamples);
    for replicate in 0..config.resamples {
        for slot in &mut resample {
            *slot = sample[rng.random_range(0..sample.len())];
        }
        let p = fit_distribution(&resample, family)
            .and_then(|distribution| {
                threshold_probability(&distribution, threshold)
                    .map_err(|reason| FitError { family, reason })
            })
            .map_err(|source| BootstrapError::ResampleFit { replicate, source })?;
        probabilities.push(p);
    }

    let any_run_probabilities = probabilities
        .iter()
        .map(|&p| probability_any(p, config.independent_runs))
        .collect::<Vec<_>>();

    Ok(BootstrapResult {
        family,
        threshold,
        confidence: config.confidence,
        independent_runs: config.independent_runs,
        single_run: IntervalEstimate::from_values(&probabilities, config.confidence),
        any_run: IntervalEstimate::from_values(&any_run_probabilities, config.confidence),
        probabilities,
        any_run_probabilities,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_distr::Distribution as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::fit::{FitFailure, fit};

    fn normal_sample(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = Pcg64::seed_from_u64(seed);
        rand_distr::Normal::new(7600.0, 80.0)
            .unwrap()
            .sample_iter(&mut rng)
            .take(n)
            .collect()
    }

    fn config(resamples: usize) -> BootstrapConfig {
        BootstrapConfig {
            resamples,
            ..BootstrapConfig::default()
        }
    }

    #[test]
    fn test_probability_any_monotone_in_runs() {
        for p in [0.0, 0.01, 0.3, 0.99, 1.0] {
            assert!((probability_any(p, 1) - p).abs() < 1e-15);
            let values = (1..=20).map(|r| probability_any(p, r)).collect::<Vec<_>>();
            assert!(values.windows(2).all(|w| w[0] <= w[1]));
        }
        assert!(probability_any(0.3, 3) < probability_any(0.3, 4));
    }

    #[test]
    fn test_interval_estimate() {
        let values = (0..=100).map(|i| f64::from(i) / 100.0).collect::<Vec<_>>();
        let estimate = IntervalEstimate::from_values(&values, 0.95);
        assert!((estimate.mean - 0.5).abs() < 1e-12);
        assert!((estimate.lower - 0.025).abs() < 1e-12);
        assert!((estimate.upper - 0.975).abs() < 1e-12);
    }

    #[test]
    fn test_mean_close_to_point_estimate() {
        let sample = normal_sample(200, 1);
        for family in Family::ALL {
            let point = fit(&sample, family, 7542.0).unwrap().p_threshold;

            let mut rng = Pcg64::seed_from_u64(42);
            let result = estimate(&sample, family, 7542.0, &config(2000), &mut rng).unwrap();

            assert_eq!(result.probabilities.len(), 2000, "{family}");
            assert_eq!(result.any_run_probabilities.len(), 2000, "{family}");
            assert!(
                (result.single_run.mean - point).abs() < 0.02,
                "{family}: {} vs {point}",
                result.single_run.mean
            );
            assert!(result.single_run.lower <= point && point <= result.single_run.upper);
            assert!(result.single_run.lower <= result.single_run.mean);
            assert!(result.single_run.mean <= result.single_run.upper);
            assert!(result.any_run.mean >= result.single_run.mean);
            assert!(
                result
                    .probabilities
                    .iter()
                    .all(|p| (0.0..=1.0).contains(p))
            );
        }
    }

    #[test]
    fn test_non_finite_probability_fails_estimate() {
        let sample = normal_sample(30, 4);
        for family in Family::ALL {
            let mut rng = Pcg64::seed_from_u64(0);
            match estimate(&sample, family, f64::NAN, &config(10), &mut rng).unwrap_err() {
                BootstrapError::ResampleFit { replicate, source } => {
                    assert_eq!(replicate, 0);
                    assert_eq!(source.family, family);
                    assert!(matches!(
                        source.reason,
                        FitFailure::NonFiniteProbability { .. }
                    ));
                }
                err => panic!("{family}: unexpected error {err}"),
            }
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let sample = normal_sample(30, 2);
        let run = |seed| {
            let mut rng = Pcg64::seed_from_u64(seed);
            estimate(&sample, Family::Gamma, 7542.0, &config(200), &mut rng).unwrap()
        };
        let a = run(9);
        let b = run(9);
        let c = run(10);
        assert_eq!(a.probabilities, b.probabilities);
        assert_ne!(a.probabilities, c.probabilities);
    }

    #[test]
    fn test_failed_refit_fails_estimate() {
        let mut rng = Pcg64::seed_from_u64(0);
        let err = estimate(&[5.0; 6], Family::WeibullMin, 1.0, &config(10), &mut rng).unwrap_err();
        assert_eq!(
            err,
            BootstrapError::ResampleFit {
                replicate: 0,
                source: FitError {
                    family: Family::WeibullMin,
                    reason: FitFailure::Degenerate,
                },
            }
        );
    }

    #[test]
    fn test_empty_sample_fails_without_drawing() {
        let mut rng = Pcg64::seed_from_u64(0);
        let err = estimate(&[], Family::Normal, 1.0, &config(10), &mut rng).unwrap_err();
        assert!(matches!(err, BootstrapError::ResampleFit { replicate: 0, .. }));
    }

    #[test]
    fn test_invalid_configuration() {
        let mut rng = Pcg64::seed_from_u64(0);
        let sample = normal_sample(10, 3);
        assert_eq!(
            estimate(&sample, Family::Normal, 1.0, &config(0), &mut rng).unwrap_err(),
            BootstrapError::NoResamples
        );
        let bad = BootstrapConfig {
            confidence: 1.0,
            ..config(10)
        };
        assert!(matches!(
            estimate(&sample, Family::Normal, 1.0, &bad, &mut rng).unwrap_err(),
            BootstrapError::InvalidConfidence { .. }
        ));
    }
}
