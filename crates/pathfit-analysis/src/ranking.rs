//! Family ranking by AICc
//!
//! Families are fitted in the configured order and ranked by ascending AICc.
//! Ties keep the configured order. Families that failed to fit are left out of
//! the ranking, and an infinite AICc (too few observations for the family's
//! parameter count) sorts after every finite one.

use crate::{
    family::Family,
    fit::{FitError, FitResult, fit},
};

/// Fit outcome of one family for one sample.
#[derive(Debug, Clone)]
pub struct FamilyFit {
    pub family: Family,
    pub outcome: Result<FitResult, FitError>,
}

impl FamilyFit {
    #[must_use]
    pub fn result(&self) -> Option<&FitResult> {
        self.outcome.as_ref().ok()
    }
}

/// Fits every family in `families` to `values`, keeping failures.
#[must_use]
pub fn fit_families(values: &[f64], families: &[Family], threshold: f64) -> Vec<FamilyFit> {
    families
        .iter()
        .map(|&family| FamilyFit {
            family,
            outcome: fit(values, family, threshold),
        })
        .collect()
}

/// Successful fits ordered by ascending AICc.
///
/// # Examples
///
/// ```
/// use pathfit_analysis::{family::Family, ranking};
///
/// let sample = [-3.0, 1.5, 2.0, 4.0, 6.5, 9.0];
/// let fits = ranking::fit_families(&sample, &Family::ALL, 0.0);
/// let ranked = ranking::rank_by_aicc(&fits);
///
/// // Only the normal family accepts the negative value
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].family, Family::Normal);
/// ```
#[must_use]
pub fn rank_by_aicc(fits: &[FamilyFit]) -> Vec<&FitResult> {
    let mut ranked = fits.iter().filter_map(FamilyFit::result).collect::<Vec<_>>();
    ranked.sort_by(|a, b| a.aicc.total_cmp(&b.aicc));
    ranked
}

/// The lowest-AICc fit, if any family could be fitted.
#[must_use]
pub fn best_by_aicc(fits: &[FamilyFit]) -> Option<&FitResult> {
    fits.iter()
        .filter_map(FamilyFit::result)
        .reduce(|best, candidate| {
            if candidate.aicc.total_cmp(&best.aicc).is_lt() {
                candidate
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::FitFailure;

    const SAMPLE: [f64; 10] = [
        7420.0, 7515.5, 7602.0, 7488.0, 7551.0, 7633.5, 7470.0, 7580.0, 7391.0, 7702.0,
    ];

    #[test]
    fn test_ranking_is_sorted_and_deterministic() {
        let fits = fit_families(&SAMPLE, &Family::ALL, 7542.0);
        let ranked = rank_by_aicc(&fits);
        assert_eq!(ranked.len(), 4);
        assert!(ranked.windows(2).all(|w| w[0].aicc <= w[1].aicc));

        let again = fit_families(&SAMPLE, &Family::ALL, 7542.0);
        let order = |r: &[&FitResult]| r.iter().map(|f| f.family).collect::<Vec<_>>();
        assert_eq!(order(&ranked), order(&rank_by_aicc(&again)));
        assert_eq!(best_by_aicc(&fits).unwrap().family, ranked[0].family);
    }

    #[test]
    fn test_failed_families_are_skipped() {
        let mut sample = SAMPLE.to_vec();
        sample[3] = -1.0;
        let fits = fit_families(&sample, &Family::ALL, 7542.0);
        assert_eq!(fits.len(), 4);
        for fit in &fits[1..] {
            let err = fit.outcome.as_ref().unwrap_err();
            assert!(matches!(err.reason, FitFailure::OutsideSupport { .. }));
        }
        let ranked = rank_by_aicc(&fits);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].family, Family::Normal);
    }

    #[test]
    fn test_ties_keep_configured_order() {
        // Three values: n - k - 1 = 0, so every AICc is infinite
        let sample = [1.0, 2.0, 4.0];
        let families = [Family::Gamma, Family::Normal, Family::WeibullMin];
        let fits = fit_families(&sample, &families, 2.0);
        let ranked = rank_by_aicc(&fits);
        assert!(ranked.iter().all(|f| f.aicc.is_infinite()));
        assert_eq!(
            ranked.iter().map(|f| f.family).collect::<Vec<_>>(),
            families.to_vec()
        );
        assert_eq!(best_by_aicc(&fits).unwrap().family, Family::Gamma);
    }

    #[test]
    fn test_no_usable_family() {
        let fits = fit_families(&[5.0], &Family::ALL, 1.0);
        assert!(rank_by_aicc(&fits).is_empty());
        assert!(best_by_aicc(&fits).is_none());
    }
}
