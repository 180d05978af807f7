//! Actual and default Bayes error-rates.
//!
//! [`fast_bayes_error_rate`] measures the error the given scores *actually*
//! achieve when they are read as LLRs and thresholded at the Bayes decision
//! threshold `t = -plo`. Compare [`crate::rocch::Rocch::bayes_error_rate`],
//! which gives the best error reachable after optimal monotonic
//! recalibration.
//!
//! Rather than applying every threshold to every score, the thresholds are
//! sorted jointly with each class's scores: the ordinal rank of a threshold
//! in that merged list, minus its own position among the thresholds, is the
//! number of class scores below it. The algorithms follow Brümmer & de
//! Villiers, "The BOSARIS Toolkit: Theory, Algorithms and Code for Surviving
//! the New DCF" (2013), <https://arxiv.org/abs/1304.2865>.

use llrkit_core::{sigmoid, LlrError, Result};

use crate::pav::Pav;
use crate::rank::ordinal_rank;
use crate::trials::validate_trials;

/// Output of [`fast_bayes_error_rate`]; every vector follows the order of the
/// operating points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActualBayesError {
    /// Actual Bayes error-rate `ptar · Pmiss + pnon · Pfa`.
    pub ber: Vec<f64>,
    /// Default error-rate `min(ptar, pnon)` (decisions from the prior alone).
    pub der: Vec<f64>,
    /// Fraction of target scores below the threshold.
    pub pmiss: Vec<f64>,
    /// Fraction of non-target scores at or above the threshold.
    pub pfa: Vec<f64>,
}

/// Optimal, actual and default error-rates over one set of operating points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BayesErrorAnalysis {
    /// Optimal (ROCCH) Bayes error-rate.
    pub optimal: Vec<f64>,
    /// Actual Bayes error-rate of the raw scores.
    pub actual: Vec<f64>,
    /// Default error-rate.
    pub default: Vec<f64>,
}

/// Default error-rate at prior log-odds `plo`: `min(sigmoid(plo), sigmoid(-plo))`.
///
/// This is the error obtained by always deciding for the a priori more
/// likely class, and is the reference a useful classifier must beat.
pub fn default_error_rate(plo: f64) -> f64 {
    sigmoid(plo).min(sigmoid(-plo))
}

/// [`default_error_rate`] at each operating point.
pub fn default_error_rates(plo: &[f64]) -> Vec<f64> {
    plo.iter().map(|&x| default_error_rate(x)).collect()
}

/// Reject NaN or descending operating points.
fn check_sorted(plo: &[f64]) -> Result<()> {
    if let Some(i) = plo.iter().position(|x| x.is_nan()) {
        return Err(LlrError::InvalidInput(format!(
            "operating point at index {} is NaN",
            i
        )));
    }
    if let Some(i) = (1..plo.len()).find(|&i| plo[i] < plo[i - 1]) {
        return Err(LlrError::UnsortedOperatingPoints { index: i });
    }
    Ok(())
}

/// Count, for each threshold, how many `scores` lie strictly below it.
///
/// `thresholds` must be ascending. Thresholds are placed ahead of the scores
/// in the joint list, so a stable sort ranks each threshold before any score
/// it ties with, and before every later (larger or equal) threshold.
fn count_below(thresholds: &[f64], scores: &[f64]) -> Vec<usize> {
    let d = thresholds.len();
    let mut joint = Vec::with_capacity(d + scores.len());
    joint.extend_from_slice(thresholds);
    joint.extend_from_slice(scores);

    let ranks = ordinal_rank(&joint);
    ranks[..d]
        .iter()
        .enumerate()
        .map(|(i, &r)| r - 1 - i)
        .collect()
}

/// Actual Bayes error-rate of `scores` used directly as LLRs.
///
/// For operating point `plo` the threshold is `t = -plo`; a trial is
/// accepted as a target when its score is `≥ t`. Hence
/// `Pmiss(t) = #{targets < t} / T` and `Pfa(t) = #{non-targets ≥ t} / N`.
///
/// `plo` must be sorted ascending (ties allowed). Outputs follow its order.
///
/// # Errors
///
/// Returns [`LlrError::UnsortedOperatingPoints`] if `plo` descends anywhere,
/// [`LlrError::InvalidInput`] if `plo` is empty, contains NaN, or the scores
/// are invalid, and [`LlrError::InsufficientData`] unless both classes are
/// present.
///
/// # Example
///
/// ```
/// use llrkit_eval::bayes_error::fast_bayes_error_rate;
///
/// let scores = [2.0, -1.0, 0.5, -2.0];
/// let labels = [true, false, true, false];
/// let out = fast_bayes_error_rate(&scores, &labels, &[-0.4, 0.0, 0.5]).unwrap();
/// assert_eq!(out.ber, vec![0.0, 0.0, 0.0]);
/// ```
pub fn fast_bayes_error_rate(
    scores: &[f64],
    labels: &[bool],
    plo: &[f64],
) -> Result<ActualBayesError> {
    check_sorted(plo)?;
    if plo.is_empty() {
        return Err(LlrError::InvalidInput("no operating points".into()));
    }
    let (n_tar, n_non) = validate_trials(scores, labels)?;

    let mut tar = Vec::with_capacity(n_tar);
    let mut non = Vec::with_capacity(n_non);
    for (&s, &l) in scores.iter().zip(labels) {
        if l {
            tar.push(s);
        } else {
            non.push(s);
        }
    }

    // plo ascending => thresholds -plo descending; reverse to ascending.
    let d = plo.len();
    let thresholds: Vec<f64> = plo.iter().rev().map(|&x| -x).collect();
    let tar_below = count_below(&thresholds, &tar);
    let non_below = count_below(&thresholds, &non);

    let t = n_tar as f64;
    let n = n_non as f64;
    let mut out = ActualBayesError {
        ber: Vec::with_capacity(d),
        der: Vec::with_capacity(d),
        pmiss: Vec::with_capacity(d),
        pfa: Vec::with_capacity(d),
    };
    for (j, &x) in plo.iter().enumerate() {
        let k = d - 1 - j;
        let pmiss = tar_below[k] as f64 / t;
        let pfa = (n_non - non_below[k]) as f64 / n;
        let ptar = sigmoid(x);
        let pnon = sigmoid(-x);
        out.ber.push(ptar * pmiss + pnon * pfa);
        out.der.push(ptar.min(pnon));
        out.pmiss.push(pmiss);
        out.pfa.push(pfa);
    }
    Ok(out)
}

/// Optimal, actual and default Bayes error-rates at the same operating
/// points.
///
/// # Errors
///
/// Same as [`fast_bayes_error_rate`] and [`Pav::fit`].
pub fn bayes_error_rate_analysis(
    scores: &[f64],
    labels: &[bool],
    plo: &[f64],
) -> Result<BayesErrorAnalysis> {
    let actual = fast_bayes_error_rate(scores, labels, plo)?;
    let optimal = Pav::fit(scores, labels)?.rocch().bayes_error_rates(plo);
    Ok(BayesErrorAnalysis {
        optimal,
        actual: actual.ber,
        default: actual.der,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rates_are_probabilities(
            trials in proptest::collection::vec((-10i32..10, any::<bool>()), 2..50),
            plo in proptest::collection::vec(-4.0f64..4.0, 1..20),
        ) {
            let scores: Vec<f64> = trials.iter().map(|&(s, _)| s as f64 * 0.3).collect();
            let labels: Vec<bool> = trials.iter().map(|&(_, l)| l).collect();
            prop_assume!(labels.iter().any(|&l| l) && labels.iter().any(|&l| !l));
            let mut plo = plo;
            plo.sort_by(|a, b| a.total_cmp(b));

            let out = fast_bayes_error_rate(&scores, &labels, &plo).unwrap();
            for j in 0..plo.len() {
                prop_assert!((0.0..=1.0).contains(&out.pmiss[j]));
                prop_assert!((0.0..=1.0).contains(&out.pfa[j]));
                prop_assert!(out.ber[j] >= 0.0 && out.ber[j] <= 1.0);
                prop_assert!(out.der[j] <= 0.5);
            }
            // Raising plo lowers the threshold: fewer misses, more false alarms.
            for j in 1..plo.len() {
                prop_assert!(out.pmiss[j] <= out.pmiss[j - 1]);
                prop_assert!(out.pfa[j] >= out.pfa[j - 1]);
            }
        }
    }
}
