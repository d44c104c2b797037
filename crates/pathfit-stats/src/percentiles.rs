/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest ranks: for `n` values the
/// `p`-th percentile sits at fractional position `(n - 1) * p / 100`. This is
/// the same definition as the default method of most numerical packages, so
/// interval bounds computed here match the usual bootstrap reporting.
///
/// `percentile` is clamped to `0.0..=100.0`.
///
/// # Returns
///
/// The value at the specified percentile. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use pathfit_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), 3.0);
/// assert_eq!(compute_percentile(&values, 25.0), 2.0);
/// assert_eq!(compute_percentile(&values, 10.0), 1.4);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let last = sorted_values.len() - 1;
    let position = last as f64 * percentile.clamp(0.0, 100.0) / 100.0;
    let lower = (position.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    let fraction = position - lower as f64;
    sorted_values[lower] + fraction * (sorted_values[upper] - sorted_values[lower])
}

/// Computes several percentiles of unsorted values in one pass over a sorted copy.
///
/// The returned vector has the same order as `percentile_points`.
#[must_use]
pub fn compute_percentiles(values: &[f64], percentile_points: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_points
        .iter()
        .map(|&p| compute_percentile(&sorted, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(compute_percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_extremes() {
        let values = [1.0, 2.0, 10.0];
        assert_eq!(compute_percentile(&values, 0.0), 1.0);
        assert_eq!(compute_percentile(&values, 100.0), 10.0);
        assert_eq!(compute_percentile(&values, 150.0), 10.0);
    }

    #[test]
    fn test_interpolated_tails() {
        let values = (0..=100).map(f64::from).collect::<Vec<_>>();
        assert!((compute_percentile(&values, 2.5) - 2.5).abs() < 1e-12);
        assert!((compute_percentile(&values, 97.5) - 97.5).abs() < 1e-12);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let result = compute_percentiles(&[5.0, 1.0, 3.0], &[0.0, 50.0, 100.0]);
        assert_eq!(result, vec![1.0, 3.0, 5.0]);
    }
}
