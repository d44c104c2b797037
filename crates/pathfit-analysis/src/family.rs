//! Parametric distribution families
//!
//! Four families can be fitted to a sample: normal, log-normal, gamma and
//! Weibull (minimum). Each family carries a [`FitPolicy`] describing which of
//! its parameters are held fixed during maximum-likelihood fitting. The three
//! positive-support families have their location pinned at zero; the normal
//! family fits all of its parameters.
//!
//! Fitted parameters are stored in a [`FittedDistribution`], which evaluates
//! log-density, CDF and quantiles for the fitted family.
//!
//! # Parameter Layout
//!
//! | Family        | Parameters               |
//! |---------------|--------------------------|
//! | `norm`        | `(loc, scale)`           |
//! | `lognorm`     | `(shape, loc, scale)`    |
//! | `gamma`       | `(shape, loc, scale)`    |
//! | `weibull_min` | `(shape, loc, scale)`    |
//!
//! For `lognorm` the shape is the standard deviation of `ln(x - loc)` and the
//! scale is `exp` of its mean.

use std::{f64::consts::SQRT_2, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use statrs::{
    distribution::{Continuous, ContinuousCDF, Gamma, LogNormal, Normal, Weibull},
    function::erf::erfc_inv,
};

use crate::fit::FitFailure;

/// A parametric distribution family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    #[serde(rename = "norm")]
    Normal,
    #[serde(rename = "lognorm")]
    LogNormal,
    #[serde(rename = "gamma")]
    Gamma,
    #[serde(rename = "weibull_min")]
    WeibullMin,
}

impl Family {
    /// All supported families, in ranking tie-break order.
    pub const ALL: [Self; 4] = [Self::Normal, Self::LogNormal, Self::Gamma, Self::WeibullMin];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "norm",
            Self::LogNormal => "lognorm",
            Self::Gamma => "gamma",
            Self::WeibullMin => "weibull_min",
        }
    }

    /// Total number of parameters, fixed or not.
    #[must_use]
    pub const fn num_params(self) -> usize {
        match self {
            Self::Normal => 2,
            Self::LogNormal | Self::Gamma | Self::WeibullMin => 3,
        }
    }

    /// Whether the family is supported on `(loc, ∞)` only.
    #[must_use]
    pub const fn has_positive_support(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Parameters held fixed when fitting this family.
    #[must_use]
    pub const fn fit_policy(self) -> FitPolicy {
        match self {
            Self::Normal => FitPolicy::FREE,
            Self::LogNormal | Self::Gamma | Self::WeibullMin => FitPolicy::fixed_location(0.0),
        }
    }

    /// Number of parameters estimated from data.
    #[must_use]
    pub const fn num_free_params(self) -> usize {
        self.num_params() - self.fit_policy().num_fixed()
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.name(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown distribution family '{name}' (expected norm, lognorm, gamma or weibull_min)")]
pub struct ParseFamilyError {
    name: String,
}

impl FromStr for Family {
    type Err = ParseFamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "norm" | "normal" => Ok(Self::Normal),
            "lognorm" | "lognormal" | "log-normal" => Ok(Self::LogNormal),
            "gamma" => Ok(Self::Gamma),
            "weibull_min" | "weibull" | "weibull-min" => Ok(Self::WeibullMin),
            _ => Err(ParseFamilyError { name: s.to_owned() }),
        }
    }
}

/// Parameters held fixed during fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitPolicy {
    /// Location held at this value, or estimated when `None`.
    pub fixed_location: Option<f64>,
}

impl FitPolicy {
    pub const FREE: Self = Self {
        fixed_location: None,
    };

    #[must_use]
    pub const fn fixed_location(loc: f64) -> Self {
        Self {
            fixed_location: Some(loc),
        }
    }

    #[must_use]
    pub const fn num_fixed(&self) -> usize {
        if self.fixed_location.is_some() { 1 } else { 0 }
    }
}

#[derive(Debug, Clone, Copy)]
enum Kernel {
    Normal(Normal),
    LogNormal(LogNormal),
    Gamma(Gamma),
    /// Unit-scale Weibull, evaluated at `(x - loc) / scale`
    StandardWeibull(Weibull),
}

/// A family with concrete parameter values.
#[derive(Debug, Clone, Copy)]
pub struct FittedDistribution {
    family: Family,
    shape: Option<f64>,
    loc: f64,
    scale: f64,
    kernel: Kernel,
}

fn invalid(err: impl fmt::Display) -> FitFailure {
    FitFailure::InvalidParameters(err.to_string())
}

impl FittedDistribution {
    pub fn normal(loc: f64, scale: f64) -> Result<Self, FitFailure> {
        let kernel = Kernel::Normal(Normal::new(loc, scale).map_err(invalid)?);
        Ok(Self {
            family: Family::Normal,
            shape: None,
            loc,
            scale,
            kernel,
        })
    }

    /// Log-normal distribution of `loc + exp(N(ln scale, shape²))`.
    pub fn log_normal(shape: f64, loc: f64, scale: f64) -> Result<Self, FitFailure> {
        check_loc(loc)?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(invalid(format_args!("scale must be positive, got {scale}")));
        }
        let kernel = Kernel::LogNormal(LogNormal::new(scale.ln(), shape).map_err(invalid)?);
        Ok(Self {
            family: Family::LogNormal,
            shape: Some(shape),
            loc,
            scale,
            kernel,
        })
    }

    pub fn gamma(shape: f64, loc: f64, scale: f64) -> Result<Self, FitFailure> {
        check_loc(loc)?;
        let kernel = Kernel::Gamma(Gamma::new(shape, scale.recip()).map_err(invalid)?);
        Ok(Self {
            family: Family::Gamma,
            shape: Some(shape),
            loc,
            scale,
            kernel,
        })
    }

    /// Weibull distribution of `loc + scale · W` with `W ~ Weibull(shape, 1)`.
    ///
    /// Density and CDF are evaluated at the standardized value, so shapes in
    /// the hundreds do not overflow `scale^shape`.
    pub fn weibull_min(shape: f64, loc: f64, scale: f64) -> Result<Self, FitFailure> {
        check_loc(loc)?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(invalid(format_args!("scale must be positive, got {scale}")));
        }
        let kernel = Kernel::StandardWeibull(Weibull::new(shape, 1.0).map_err(invalid)?);
        Ok(Self {
            family: Family::WeibullMin,
            shape: Some(shape),
            loc,
            scale,
            kernel,
        })
    }

    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    #[must_use]
    pub fn shape(&self) -> Option<f64> {
        self.shape
    }

    #[must_use]
    pub fn loc(&self) -> f64 {
        self.loc
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Parameter vector in the family's layout (see module docs).
    #[must_use]
    pub fn params(&self) -> Vec<f64> {
        self.shape
            .into_iter()
            .chain([self.loc, self.scale])
            .collect()
    }

    /// Natural log of the density at `x`.
    #[must_use]
    pub fn ln_pdf(&self, x: f64) -> f64 {
        let y = x - self.loc;
        match &self.kernel {
            Kernel::Normal(d) => d.ln_pdf(x),
            _ if y <= 0.0 => f64::NEG_INFINITY,
            Kernel::LogNormal(d) => d.ln_pdf(y),
            Kernel::Gamma(d) => d.ln_pdf(y),
            Kernel::StandardWeibull(d) => d.ln_pdf(y / self.scale) - self.scale.ln(),
        }
    }

    /// Probability of a value at or below `x`.
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let y = x - self.loc;
        match &self.kernel {
            Kernel::Normal(d) => d.cdf(x),
            _ if y <= 0.0 => 0.0,
            Kernel::LogNormal(d) => d.cdf(y),
            Kernel::Gamma(d) => d.cdf(y),
            Kernel::StandardWeibull(d) => d.cdf(y / self.scale),
        }
    }

    /// Inverse CDF. Returns `NaN` when `p` is outside `[0, 1]`.
    #[must_use]
    pub fn quantile(&self, p: f64) -> f64 {
        if !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        match &self.kernel {
            Kernel::Normal(_) => self.loc + self.scale * standard_normal_quantile(p),
            Kernel::LogNormal(_) => {
                let shape = self.shape.unwrap_or(f64::NAN);
                self.loc + self.scale * (shape * standard_normal_quantile(p)).exp()
            }
            Kernel::Gamma(d) => self.loc + d.inverse_cdf(p),
            Kernel::StandardWeibull(_) => {
                let shape = self.shape.unwrap_or(f64::NAN);
                self.loc + self.scale * (-(-p).ln_1p()).powf(shape.recip())
            }
        }
    }

    /// Sum of log-densities over `values`.
    #[must_use]
    pub fn log_likelihood(&self, values: &[f64]) -> f64 {
        values.iter().map(|&x| self.ln_pdf(x)).sum()
    }
}

fn standard_normal_quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

fn check_loc(loc: f64) -> Result<(), FitFailure> {
    if loc.is_finite() {
        Ok(())
    } else {
        Err(invalid(format_args!("location must be finite, got {loc}")))
    }
}
