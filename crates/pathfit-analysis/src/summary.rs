//! Per-run summary statistics and run rankings

use std::collections::BTreeMap;

use pathfit_stats::descriptive::DescriptiveStats;
use serde::Serialize;

/// Runs ordered by a location statistic, best (lowest distance) first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRanking {
    /// `(run, median)` by ascending median
    pub by_median: Vec<(u32, f64)>,
    /// `(run, mean)` by ascending mean
    pub by_mean: Vec<(u32, f64)>,
}

/// Descriptive statistics of every non-empty sample.
#[must_use]
pub fn summarize_runs(samples: &BTreeMap<u32, Vec<f64>>) -> BTreeMap<u32, DescriptiveStats> {
    samples
        .iter()
        .filter_map(|(run, sample)| Some((*run, DescriptiveStats::new(sample.iter().copied())?)))
        .collect()
}

/// Orders runs by median and by mean; ties are broken by run identifier.
#[must_use]
pub fn rank_runs(summaries: &BTreeMap<u32, DescriptiveStats>) -> RunRanking {
    let ranked = |key: fn(&DescriptiveStats) -> f64| {
        let mut scores = summaries
            .iter()
            .map(|(run, stats)| (*run, key(stats)))
            .collect::<Vec<_>>();
        scores.sort_by(|a, b| a.1.total_cmp(&b.1));
        scores
    };
    RunRanking {
        by_median: ranked(|s| s.median),
        by_mean: ranked(|s| s.mean),
    }
}
