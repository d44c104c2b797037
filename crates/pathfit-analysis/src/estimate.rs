//! Maximum-likelihood estimators
//!
//! Every estimator works directly on the borrowed sample and allocates
//! nothing, so the bootstrap can refit thousands of resamples cheaply.
//! Inputs are validated by [`validate`] before any estimator runs.

use pathfit_stats::special::trigamma;
use statrs::function::gamma::digamma;

use crate::{
    family::{Family, FitPolicy, FittedDistribution},
    fit::FitFailure,
};

/// Relative step size at which the iterative solvers stop.
const TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;
/// Residual below which a likelihood equation is treated as solved.
const NOISE_FLOOR: f64 = 8.0 * f64::EPSILON;

/// Fits `family` to `values` honoring `policy`.
pub(crate) fn maximum_likelihood(
    family: Family,
    policy: FitPolicy,
    values: &[f64],
) -> Result<FittedDistribution, FitFailure> {
    validate(family, policy, values)?;
    match (family, policy.fixed_location) {
        (Family::Normal, loc) => normal(values, loc),
        (_, None) => Err(FitFailure::UnsupportedPolicy),
        (Family::LogNormal, Some(loc)) => log_normal(values, loc),
        (Family::Gamma, Some(loc)) => gamma(values, loc),
        (Family::WeibullMin, Some(loc)) => weibull_min(values, loc),
    }
}

fn validate(family: Family, policy: FitPolicy, values: &[f64]) -> Result<(), FitFailure> {
    if values.len() < 2 {
        return Err(FitFailure::TooFewValues { n: values.len() });
    }
    if values.iter().any(|x| !x.is_finite()) {
        return Err(FitFailure::NonFiniteValue);
    }
    let (min, max) = min_max(values);
    if min == max {
        return Err(FitFailure::Degenerate);
    }
    if family.has_positive_support() {
        let lower_bound = policy.fixed_location.unwrap_or(0.0);
        if min <= lower_bound {
            return Err(FitFailure::OutsideSupport {
                value: min,
                lower_bound,
            });
        }
    }
    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &x| {
            (min.min(x), max.max(x))
        })
}

#[expect(clippy::cast_precision_loss)]
fn mean_by(values: &[f64], f: impl Fn(f64) -> f64) -> f64 {
    values.iter().map(|&x| f(x)).sum::<f64>() / values.len() as f64
}

fn normal(values: &[f64], fixed_loc: Option<f64>) -> Result<FittedDistribution, FitFailure> {
    let loc = fixed_loc.unwrap_or_else(|| mean_by(values, |x| x));
    let scale = mean_by(values, |x| (x - loc).powi(2)).sqrt();
    if scale <= 0.0 {
        return Err(FitFailure::Degenerate);
    }
    FittedDistribution::normal(loc, scale)
}

fn log_normal(values: &[f64], loc: f64) -> Result<FittedDistribution, FitFailure> {
    let mu = mean_by(values, |x| (x - loc).ln());
    let shape = mean_by(values, |x| ((x - loc).ln() - mu).powi(2)).sqrt();
    if shape <= 0.0 {
        return Err(FitFailure::Degenerate);
    }
    FittedDistribution::log_normal(shape, loc, mu.exp())
}

/// Solves `ln a - ψ(a) = ln(mean) - mean(ln)` for the shape `a`.
fn gamma(values: &[f64], loc: f64) -> Result<FittedDistribution, FitFailure> {
    let mean = mean_by(values, |x| x - loc);
    let s = mean.ln() - mean_by(values, |x| (x - loc).ln());
    // Jensen gap; zero only for constant data
    if !s.is_finite() || s <= 0.0 {
        return Err(FitFailure::Degenerate);
    }

    // Minka's closed-form approximation, already within a few percent
    let mut shape = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
    for _ in 0..MAX_ITERATIONS {
        let f = shape.ln() - digamma(shape) - s;
        // For large shapes `f` is a difference of nearly equal terms
        if f.abs() <= NOISE_FLOOR * shape.ln().abs().max(1.0) {
            return FittedDistribution::gamma(shape, loc, mean / shape);
        }
        let df = shape.recip() - trigamma(shape);
        let mut next = shape - f / df;
        if next.is_nan() || next <= 0.0 {
            next = shape / 2.0;
        }
        if !next.is_finite() {
            break;
        }
        let converged = (next - shape).abs() <= TOLERANCE * shape;
        shape = next;
        if converged {
            return FittedDistribution::gamma(shape, loc, mean / shape);
        }
    }
    Err(FitFailure::NoConvergence {
        iterations: MAX_ITERATIONS,
    })
}

/// Profile-likelihood equation for the Weibull shape on data scaled to `(0, 1]`.
///
/// Returns `(g, g')` where
/// `g(c) = Σ zᶜ ln z / Σ zᶜ - 1/c - mean(ln z)`, increasing in `c`.
fn weibull_equation(values: &[f64], loc: f64, max: f64, mean_ln_z: f64, c: f64) -> (f64, f64) {
    let (mut s0, mut s1, mut s2) = (0.0, 0.0, 0.0);
    for &x in values {
        let ln_z = ((x - loc) / max).ln();
        let w = (c * ln_z).exp();
        s0 += w;
        s1 += w * ln_z;
        s2 += w * ln_z * ln_z;
    }
    let g = s1 / s0 - c.recip() - mean_ln_z;
    let dg = (s2 * s0 - s1 * s1) / (s0 * s0) + c.recip().powi(2);
    (g, dg)
}

/// Safeguarded Newton iteration on [`weibull_equation`].
///
/// A Newton step leaving the current bracket is replaced by bisection, or by
/// doubling while no upper bound is known yet.
fn weibull_min(values: &[f64], loc: f64) -> Result<FittedDistribution, FitFailure> {
    let (_, max) = min_max(values);
    let max = max - loc;
    let mean_ln_z = mean_by(values, |x| ((x - loc) / max).ln());
    let sd_ln_z = mean_by(values, |x| (((x - loc) / max).ln() - mean_ln_z).powi(2)).sqrt();
    if sd_ln_z.is_nan() || sd_ln_z <= 0.0 {
        return Err(FitFailure::Degenerate);
    }

    // Gumbel moment estimate: sd(ln x) = π / (c √6)
    let mut c = std::f64::consts::PI / (6.0_f64.sqrt() * sd_ln_z);
    let mut lower = 0.0;
    let mut upper = f64::INFINITY;
    for _ in 0..MAX_ITERATIONS {
        let (g, dg) = weibull_equation(values, loc, max, mean_ln_z, c);
        if !(g.is_finite() && dg.is_finite()) {
            break;
        }
        if g.abs() <= NOISE_FLOOR * (mean_ln_z.abs() + c.recip()) {
            return weibull_from_shape(values, loc, max, c);
        }
        if g < 0.0 {
            lower = c;
        } else {
            upper = c;
        }
        let mut next = c - g / dg;
        if next.is_nan() || next <= lower || next >= upper {
            next = if upper.is_finite() {
                (lower + upper) / 2.0
            } else {
                c * 2.0
            };
        }
        let converged = (next - c).abs() <= TOLERANCE * c;
        c = next;
        if converged {
            return weibull_from_shape(values, loc, max, c);
        }
    }
    Err(FitFailure::NoConvergence {
        iterations: MAX_ITERATIONS,
    })
}

/// Scale estimate given the shape: `max · (mean zᶜ)^(1/c)`.
fn weibull_from_shape(
    values: &[f64],
    loc: f64,
    max: f64,
    c: f64,
) -> Result<FittedDistribution, FitFailure> {
    let mean_z_c = mean_by(values, |x| ((x - loc) / max).powf(c));
    FittedDistribution::weibull_min(c, loc, max * mean_z_c.powf(c.recip()))
}
