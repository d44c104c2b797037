//! Maximum-likelihood fitting and model-selection statistics
//!
//! [`fit`] estimates a family's parameters from a sample and reports the
//! log-likelihood, information criteria and the fitted probability of
//! reaching a distance threshold.
//!
//! # Information Criteria
//!
//! With `k` free parameters, `n` observations and log-likelihood `LL`:
//!
//! - `AIC  = 2k - 2 LL`
//! - `AICc = AIC + 2k(k + 1) / (n - k - 1)`, or `+∞` when `n - k - 1 <= 0`
//! - `BIC  = k ln(n) - 2 LL`
//!
//! Parameters fixed by the family's [`FitPolicy`](crate::family::FitPolicy)
//! do not count towards `k`.

use serde::Serialize;

use crate::{
    estimate,
    family::{Family, FittedDistribution},
};

/// Why a family could not be fitted to a sample.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum FitFailure {
    #[display("need at least 2 values, got {n}")]
    TooFewValues { n: usize },
    #[display("sample contains a non-finite value")]
    NonFiniteValue,
    #[display("sample has fewer than 2 distinct values")]
    Degenerate,
    #[display("value {value} is outside the support (must exceed {lower_bound})")]
    OutsideSupport { value: f64, lower_bound: f64 },
    #[display("family requires a fixed location")]
    UnsupportedPolicy,
    #[display("likelihood equation not solved after {iterations} iterations")]
    NoConvergence { iterations: usize },
    #[display("fitted parameters rejected: {_0}")]
    InvalidParameters(String),
    #[display("log-likelihood is not finite")]
    NonFiniteLikelihood,
    #[display("probability at threshold {threshold} is not finite")]
    NonFiniteProbability { threshold: f64 },
}

/// A family that cannot be fitted to a given sample.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("cannot fit {family} distribution: {reason}")]
pub struct FitError {
    pub family: Family,
    pub reason: FitFailure,
}

/// Outcome of fitting one family to one sample.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    pub family: Family,
    #[serde(skip)]
    pub distribution: FittedDistribution,
    /// Fitted parameters, fixed ones included
    pub params: Vec<f64>,
    /// Number of free parameters
    pub k: usize,
    /// Sample size
    pub n: usize,
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
    pub threshold: f64,
    /// Fitted probability of a distance at or below `threshold`
    pub p_threshold: f64,
}

/// Estimates the parameters of `family` from `values`.
///
/// This is the lightweight part of [`fit`]: no statistics are computed, which
/// keeps bootstrap refits cheap.
pub fn fit_distribution(values: &[f64], family: Family) -> Result<FittedDistribution, FitError> {
    estimate::maximum_likelihood(family, family.fit_policy(), values)
        .map_err(|reason| FitError { family, reason })
}

/// Fits `family` to `values` by maximum likelihood.
///
/// # Errors
///
/// Returns [`FitError`] for samples with fewer than two distinct values,
/// non-finite values, values outside a positive family's support, when the
/// likelihood equations cannot be solved, or when the fitted CDF at
/// `threshold` is not a number.
///
/// # Examples
///
/// ```
/// use pathfit_analysis::{family::Family, fit::fit};
///
/// let sample = [7400.0, 7510.0, 7620.0, 7480.0, 7555.0];
/// let result = fit(&sample, Family::Normal, 7542.0).unwrap();
/// assert_eq!(result.k, 2);
/// assert!(result.aicc >= result.aic);
/// assert!((0.0..=1.0).contains(&result.p_threshold));
/// ```
pub fn fit(values: &[f64], family: Family, threshold: f64) -> Result<FitResult, FitError> {
    let distribution = fit_distribution(values, family)?;

    let log_likelihood = distribution.log_likelihood(values);
    if !log_likelihood.is_finite() {
        return Err(FitError {
            family,
            reason: FitFailure::NonFiniteLikelihood,
        });
    }

    let k = family.num_free_params();
    let n = values.len();
    Ok(FitResult {
        family,
        distribution,
        params: distribution.params(),
        k,
        n,
        log_likelihood,
        aic: aic(k, log_likelihood),
        aicc: aicc(k, n, log_likelihood),
        bic: bic(k, n, log_likelihood),
        threshold,
        p_threshold: threshold_probability(&distribution, threshold)
            .map_err(|reason| FitError { family, reason })?,
    })
}

/// Fitted probability of a value at or below `threshold`.
pub(crate) fn threshold_probability(
    distribution: &FittedDistribution,
    threshold: f64,
) -> Result<f64, FitFailure> {
    let p = distribution.cdf(threshold);
    if p.is_finite() {
        Ok(p)
    } else {
        Err(FitFailure::NonFiniteProbability { threshold })
    }
}

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn aic(k: usize, log_likelihood: f64) -> f64 {
    2.0 * k as f64 - 2.0 * log_likelihood
}

/// Small-sample corrected AIC; infinite when `n <= k + 1`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn aicc(k: usize, n: usize, log_likelihood: f64) -> f64 {
    if n <= k + 1 {
        return f64::INFINITY;
    }
    let k_f = k as f64;
    aic(k, log_likelihood) + 2.0 * k_f * (k_f + 1.0) / (n - k - 1) as f64
}

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn bic(k: usize, n: usize, log_likelihood: f64) -> f64 {
    k as f64 * (n as f64).ln() - 2.0 * log_likelihood
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{PI, SQRT_2};

    use rand::SeedableRng as _;
    use rand_distr::Distribution as _;
    use rand_pcg::Pcg64;
    use statrs::function::{erf::erfc, gamma::ln_gamma};

    use super::*;

    fn distance_sample() -> Vec<f64> {
        let mut rng = Pcg64::seed_from_u64(17);
        rand_distr::Normal::new(7550.0, 80.0)
            .unwrap()
            .sample_iter(&mut rng)
            .take(30)
            .collect()
    }

    fn standard_normal_cdf(z: f64) -> f64 {
        0.5 * erfc(-z / SQRT_2)
    }

    /// Composite Simpson rule with `n` (even) intervals.
    #[expect(clippy::cast_precision_loss)]
    fn simpson(f: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> f64 {
        let h = (b - a) / n as f64;
        let inner = (1..n)
            .map(|i| f(a + i as f64 * h) * if i % 2 == 1 { 4.0 } else { 2.0 })
            .sum::<f64>();
        (f(a) + inner + f(b)) * h / 3.0
    }

    /// Closed-form log-density of the fitted family.
    fn reference_ln_pdf(result: &FitResult, x: f64) -> f64 {
        let p = &result.params;
        match result.family {
            Family::Normal => {
                let z = (x - p[0]) / p[1];
                -0.5 * (2.0 * PI).ln() - p[1].ln() - z * z / 2.0
            }
            Family::LogNormal => {
                let z = (x.ln() - p[2].ln()) / p[0];
                -x.ln() - p[0].ln() - 0.5 * (2.0 * PI).ln() - z * z / 2.0
            }
            Family::Gamma => {
                (p[0] - 1.0) * x.ln() - x / p[2] - ln_gamma(p[0]) - p[0] * p[2].ln()
            }
            Family::WeibullMin => {
                let z = x / p[2];
                p[0].ln() - p[2].ln() + (p[0] - 1.0) * z.ln() - z.powf(p[0])
            }
        }
    }

    const SAMPLE: [f64; 8] = [
        7420.0, 7515.5, 7602.0, 7488.0, 7551.0, 7633.5, 7470.0, 7580.0,
    ];

    #[test]
    fn test_normal_statistics_match_closed_form() {
        let result = fit(&SAMPLE, Family::Normal, 7542.0).unwrap();
        let n = SAMPLE.len() as f64;
        let mean = SAMPLE.iter().sum::<f64>() / n;
        let var = SAMPLE.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        // Maximized normal log-likelihood: -n/2 (ln(2π var) + 1)
        let ll = -n / 2.0 * ((2.0 * PI * var).ln() + 1.0);

        assert_eq!(result.k, 2);
        assert_eq!(result.n, 8);
        assert!((result.log_likelihood - ll).abs() < 1e-9);
        assert!((result.aic - (4.0 - 2.0 * ll)).abs() < 1e-9);
        assert!((result.aicc - (result.aic + 12.0 / 5.0)).abs() < 1e-9);
        assert!((result.bic - (2.0 * n.ln() - 2.0 * ll)).abs() < 1e-9);
        assert_eq!(result.params.len(), 2);
        assert!((result.params[0] - mean).abs() < 1e-9);
    }

    #[test]
    fn test_all_families_fit_positive_sample() {
        for family in Family::ALL {
            let result = fit(&SAMPLE, family, 7542.0).unwrap();
            assert_eq!(result.k, 2, "{family}");
            assert_eq!(result.params.len(), family.num_params());
            assert!(result.aicc >= result.aic);
            assert!((0.0..=1.0).contains(&result.p_threshold));
            if family.has_positive_support() {
                assert_eq!(result.params[1], 0.0);
            }
        }
    }

    #[test]
    fn test_all_families_fit_distance_scale_sample() {
        let sample = distance_sample();
        for family in Family::ALL {
            let result = fit(&sample, family, 7542.0).unwrap();
            assert!(result.log_likelihood.is_finite(), "{family}");
            assert!(result.p_threshold > 0.0 && result.p_threshold < 1.0, "{family}");
        }
        let weibull = fit(&sample, Family::WeibullMin, 7542.0).unwrap();
        assert!(weibull.params[0] > 50.0);
    }

    #[test]
    fn test_density_and_probability_match_closed_forms() {
        let sample = distance_sample();
        for family in Family::ALL {
            let result = fit(&sample, family, 7542.0).unwrap();
            let d = &result.distribution;

            for x in [7400.0, 7542.0, 7700.0] {
                let expected = reference_ln_pdf(&result, x);
                assert!(
                    (d.ln_pdf(x) - expected).abs() < 1e-8,
                    "{family} ln_pdf({x}): {} vs {expected}",
                    d.ln_pdf(x)
                );
            }
            let ll = sample.iter().map(|&x| reference_ln_pdf(&result, x)).sum::<f64>();
            assert!((result.log_likelihood - ll).abs() < 1e-6, "{family}");

            let p = &result.params;
            let expected = match family {
                Family::Normal => standard_normal_cdf((7542.0 - p[0]) / p[1]),
                Family::LogNormal => standard_normal_cdf((7542.0_f64.ln() - p[2].ln()) / p[0]),
                // No closed form: integrate the density over the bulk of the mass
                Family::Gamma => {
                    let sd = p[0].sqrt() * p[2];
                    let lower = (7542.0 - 15.0 * sd).max(0.0);
                    simpson(|x| reference_ln_pdf(&result, x).exp(), lower, 7542.0, 6000)
                }
                Family::WeibullMin => -(-(7542.0 / p[2]).powf(p[0])).exp_m1(),
            };
            assert!(
                (result.p_threshold - expected).abs() < 1e-7,
                "{family}: {} vs {expected}",
                result.p_threshold
            );
        }
    }

    #[test]
    fn test_non_finite_threshold_probability_is_an_error() {
        for family in Family::ALL {
            let err = fit(&SAMPLE, family, f64::NAN).unwrap_err();
            assert_eq!(err.family, family);
            assert!(matches!(
                err.reason,
                FitFailure::NonFiniteProbability { .. }
            ));
        }
    }

    #[test]
    fn test_threshold_probability_is_cdf() {
        let result = fit(&SAMPLE, Family::Gamma, 7542.0).unwrap();
        assert_eq!(result.p_threshold, result.distribution.cdf(7542.0));
        let below = fit(&SAMPLE, Family::Gamma, 0.0).unwrap();
        assert_eq!(below.p_threshold, 0.0);
    }

    #[test]
    fn test_aicc_infinite_for_tiny_samples() {
        let result = fit(&[1.0, 2.0, 4.0], Family::Normal, 2.0).unwrap();
        assert_eq!(result.aicc, f64::INFINITY);
        assert!(result.aic.is_finite());
        assert_eq!(aicc(2, 3, -1.0), f64::INFINITY);
        assert!(aicc(2, 4, -1.0).is_finite());
    }

    #[test]
    fn test_aicc_converges_to_aic() {
        let ll = -100.0;
        let gaps = [10, 100, 1000, 100_000]
            .map(|n| aicc(2, n, ll) - aic(2, ll));
        assert!(gaps.iter().all(|gap| *gap >= 0.0));
        assert!(gaps.windows(2).all(|w| w[1] < w[0]));
        assert!(gaps[3] < 1e-3);
    }

    #[test]
    fn test_negative_value_fails_positive_families_only() {
        let sample = [-5.0, 10.0, 12.0, 15.0];
        assert!(fit(&sample, Family::Normal, 0.0).is_ok());
        for family in [Family::LogNormal, Family::Gamma, Family::WeibullMin] {
            let err = fit(&sample, family, 0.0).unwrap_err();
            assert_eq!(err.family, family);
            assert!(matches!(err.reason, FitFailure::OutsideSupport { .. }));
        }
    }

    #[test]
    fn test_zero_is_outside_positive_support() {
        let err = fit(&[0.0, 1.0, 2.0], Family::WeibullMin, 1.0).unwrap_err();
        assert_eq!(
            err.reason,
            FitFailure::OutsideSupport {
                value: 0.0,
                lower_bound: 0.0
            }
        );
    }

    #[test]
    fn test_error_message_names_family() {
        let err = fit(&[3.0, 3.0], Family::LogNormal, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot fit lognorm distribution: sample has fewer than 2 distinct values"
        );
    }
}
