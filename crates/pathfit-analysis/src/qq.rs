//! Quantile-quantile data for fitted distributions
//!
//! Pairs each sorted sample value with the fitted distribution's quantile at
//! the plotting position `(i - 0.5) / n`. Points close to the diagonal
//! indicate a good fit. Rendering is left to the caller.

use serde::Serialize;

use crate::family::{Family, FittedDistribution};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QqPoint {
    pub probability: f64,
    pub theoretical: f64,
    pub empirical: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QqPlot {
    pub family: Family,
    pub points: Vec<QqPoint>,
}

impl QqPlot {
    /// # Examples
    ///
    /// ```
    /// use pathfit_analysis::{family::FittedDistribution, qq::QqPlot};
    ///
    /// let dist = FittedDistribution::normal(0.0, 1.0).unwrap();
    /// let plot = QqPlot::new(&dist, &[1.0, -1.0]);
    /// assert_eq!(plot.points[0].empirical, -1.0);
    /// assert_eq!(plot.points[0].probability, 0.25);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(distribution: &FittedDistribution, sample: &[f64]) -> Self {
        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len() as f64;
        let points = sorted
            .into_iter()
            .enumerate()
            .map(|(i, empirical)| {
                let probability = (i as f64 + 0.5) / n;
                QqPoint {
                    probability,
                    theoretical: distribution.quantile(probability),
                    empirical,
                }
            })
            .collect();
        Self {
            family: distribution.family(),
            points,
        }
    }
}
