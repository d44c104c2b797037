//! Numeric building blocks for the pathfit workspace.
//!
//! This crate collects the small statistical helpers shared by the log
//! analysis pipeline:
//!
//! - **Descriptive statistics**: min, max, mean, median, sample variance
//! - **Percentiles**: linear-interpolation percentiles over sorted data
//! - **Special functions**: the trigamma function used by likelihood solvers
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation
//! - [`special`]: Special functions missing from the distribution library
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use pathfit_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.5);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use pathfit_stats::percentiles::compute_percentile;
//!
//! let values = [1.0, 2.0, 3.0, 4.0];
//! assert_eq!(compute_percentile(&values, 50.0), 2.5);
//! ```

pub mod descriptive;
pub mod percentiles;
pub mod special;
