//! Distribution fitting and bootstrap analysis of run distances
//!
//! This crate characterizes the terminal-distance samples of repeated
//! optimization runs.
//!
//! # Workflow
//!
//! 1. **Fit Families** ([`fit::fit`]): maximum-likelihood fit of normal,
//!    log-normal, gamma and Weibull-min distributions with log-likelihood,
//!    AIC, AICc, BIC and the CDF at a distance threshold
//! 2. **Rank** ([`ranking::rank_by_aicc`]): order the successful fits by AICc
//! 3. **Bootstrap** ([`bootstrap::estimate`]): resample and refit the best
//!    family to get confidence intervals for the threshold probability
//! 4. **Inspect** ([`qq::QqPlot`], [`summary::rank_runs`]): Q-Q data and run
//!    summaries for reporting
//!
//! [`pipeline::analyze_runs`] runs steps 1–3 for every run.
//!
//! # Examples
//!
//! ```
//! use pathfit_analysis::{bootstrap::{self, BootstrapConfig}, family::Family, ranking};
//! use rand::SeedableRng;
//!
//! let sample = [
//!     7480.0, 7530.0, 7555.0, 7610.0, 7502.0, 7588.0, 7521.0, 7466.0, 7634.0, 7549.0,
//! ];
//! let fits = ranking::fit_families(&sample, &Family::ALL, 7542.0);
//! let best = ranking::best_by_aicc(&fits).unwrap();
//!
//! let config = BootstrapConfig { resamples: 200, ..BootstrapConfig::default() };
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let result = bootstrap::estimate(&sample, best.family, 7542.0, &config, &mut rng).unwrap();
//! assert!(result.single_run.lower <= result.single_run.upper);
//! ```

mod estimate;

pub mod bootstrap;
pub mod family;
pub mod fit;
pub mod pipeline;
pub mod qq;
pub mod ranking;
pub mod summary;
