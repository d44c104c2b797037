//! Table display for the text report

use std::collections::BTreeMap;

use pathfit_analysis::{
    pipeline::{AnalysisConfig, BootstrapOutcome, RunAnalysis},
    summary::RunRanking,
};
use pathfit_stats::descriptive::DescriptiveStats;

use crate::util;

/// Formats a statistic, spelling out infinities and undefined values.
fn metric(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "N/A".to_string()
    } else if value.is_infinite() {
        let sign = if value.is_sign_negative() { "-" } else { "" };
        format!("{sign}inf")
    } else {
        format!("{value:.precision$}")
    }
}

pub(super) fn print_settings(config: &AnalysisConfig, seed: u64) {
    let families = config
        .families
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    println!("Settings:");
    println!("  Threshold   : {}", config.threshold);
    println!("  Families    : {families}");
    println!("  Resamples   : {}", config.bootstrap.resamples);
    println!("  Seed        : {seed}");
}

pub(super) fn print_run_statistics(summaries: &BTreeMap<u32, DescriptiveStats>) {
    println!(
        "  {:>6} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Run", "N", "Min", "Median", "Mean", "Max", "Variance", "Std Dev",
    );
    // run(6) + n(6) + 6 stats(12 each) + spaces(7)
    println!("  {}", "-".repeat(91));
    for (run, stats) in summaries {
        println!(
            "  {:>6} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            run,
            stats.count,
            stats.min,
            stats.median,
            stats.mean,
            stats.max,
            stats.variance,
            stats.std_dev,
        );
    }
}

pub(super) fn print_run_ranking(ranking: &RunRanking) {
    println!(
        "  {:>4}  {:>6} {:>12}  {:>6} {:>12}",
        "Rank", "Run", "Median", "Run", "Mean"
    );
    println!("  {}", "-".repeat(46));
    for (rank, (median, mean)) in ranking.by_median.iter().zip(&ranking.by_mean).enumerate() {
        println!(
            "  {:>4}  {:>6} {:>12.2}  {:>6} {:>12.2}",
            rank + 1,
            median.0,
            median.1,
            mean.0,
            mean.1
        );
    }
}

pub(super) fn print_fit_metrics(analysis: &RunAnalysis, threshold: f64) {
    let best = analysis
        .best_family
        .map_or("none".to_string(), |family| family.to_string());
    println!(
        "Fit Metrics: run {} (n={}, best by AICc: {best})",
        analysis.run,
        analysis.sample.len()
    );
    let p_label = format!("P(<={threshold})");
    println!(
        "  {:<12} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "Family", "LL", "AIC", "AICc", "BIC", p_label,
    );
    // family(12) + 4 metrics(12 each) + probability(14) + spaces(5)
    println!("  {}", "-".repeat(79));
    for fit in &analysis.fits {
        match &fit.outcome {
            Ok(result) => println!(
                "  {:<12} {:>12} {:>12} {:>12} {:>12} {:>14}",
                fit.family,
                metric(result.log_likelihood, 2),
                metric(result.aic, 2),
                metric(result.aicc, 2),
                metric(result.bic, 2),
                metric(result.p_threshold, 6),
            ),
            Err(err) => println!("  {:<12} failed: {}", fit.family, err.reason),
        }
    }
}

pub(super) fn print_bootstrap_intervals<'a, I>(analyses: I)
where
    I: IntoIterator<Item = &'a RunAnalysis>,
{
    println!(
        "  {:>6} {:<12} {:>10} {:>23} {:>10} {:>23}",
        "Run", "Family", "P(single)", "CI", "P(any)", "CI",
    );
    // run(6) + family(12) + 2 * (mean(10) + ci(23)) + spaces(5)
    println!("  {}", "-".repeat(89));
    for analysis in analyses {
        match &analysis.bootstrap {
            BootstrapOutcome::Estimated(result) => {
                let single = &result.single_run;
                let any = &result.any_run;
                let single_ci = format!("[{}, {}]", metric(single.lower, 6), metric(single.upper, 6));
                let any_ci = format!("[{}, {}]", metric(any.lower, 6), metric(any.upper, 6));
                println!(
                    "  {:>6} {:<12} {:>10} {:>23} {:>10} {:>23}",
                    analysis.run,
                    result.family,
                    metric(single.mean, 6),
                    single_ci,
                    metric(any.mean, 6),
                    any_ci,
                );
            }
            BootstrapOutcome::Failed(err) => {
                println!("  {:>6} failed: {}", analysis.run, util::error_chain(err));
            }
            BootstrapOutcome::NoUsableFamily => {
                println!("  {:>6} skipped: no family could be fitted", analysis.run);
            }
        }
    }
}
