//! One-call summaries of a trial set.
//!
//! Each function validates its input, fits PAV once, and reads the
//! requested metrics off the fit:
//!
//! - [`eer_cllr_min_cllr`] / [`tarnon_eer_cllr_min_cllr`] — the usual
//!   three-number [`EvalSummary`]
//! - [`tarnon_eer`], [`scores_labels_eer`] — EER alone
//! - [`tarnon_auc`], [`tarnon_eer_auc`] — hull area, optionally with EER

use llrkit_core::Result;

use crate::cllr::{cllr, min_cllr};
use crate::normal::{probit, probit_inv};
use crate::pav::Pav;
use crate::trials::scores_labels_to_tarnon;

/// EER, Cllr and minCllr of one trial set.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalSummary {
    pub eer: f64,
    pub cllr: f64,
    pub min_cllr: f64,
}

/// [`EvalSummary`] of labelled scores.
///
/// # Errors
///
/// Returns an error if the slices differ in length, a score is NaN, or
/// either class is absent.
pub fn eer_cllr_min_cllr(scores: &[f64], labels: &[bool]) -> Result<EvalSummary> {
    let (tar, non) = scores_labels_to_tarnon(scores, labels)?;
    tarnon_eer_cllr_min_cllr(&tar, &non)
}

/// [`EvalSummary`] of separate target and non-target scores.
///
/// # Example
///
/// ```
/// use llrkit_eval::quick_eval::tarnon_eer_cllr_min_cllr;
///
/// let s = tarnon_eer_cllr_min_cllr(&[1.0, 2.0, 3.0], &[-1.0, -2.0, -3.0]).unwrap();
/// assert_eq!(s.eer, 0.0);
/// assert_eq!(s.min_cllr, 0.0);
/// ```
pub fn tarnon_eer_cllr_min_cllr(tar: &[f64], non: &[f64]) -> Result<EvalSummary> {
    let pav = Pav::from_tarnon(tar, non)?;
    Ok(EvalSummary {
        eer: pav.rocch().eer(),
        cllr: cllr(tar, non)?,
        min_cllr: min_cllr(&pav),
    })
}

/// Equal error-rate of separate target and non-target scores.
pub fn tarnon_eer(tar: &[f64], non: &[f64]) -> Result<f64> {
    Ok(Pav::from_tarnon(tar, non)?.rocch().eer())
}

/// Equal error-rate of labelled scores.
pub fn scores_labels_eer(scores: &[f64], labels: &[bool]) -> Result<f64> {
    Ok(Pav::fit(scores, labels)?.rocch().eer())
}

/// Area under the ROC convex hull, read as an error: 0 for separable
/// classes, at most 0.5.
pub fn tarnon_auc(tar: &[f64], non: &[f64]) -> Result<f64> {
    Ok(Pav::from_tarnon(tar, non)?.rocch().auc())
}

/// `(eer, auc)` from a single PAV fit.
pub fn tarnon_eer_auc(tar: &[f64], non: &[f64]) -> Result<(f64, f64)> {
    let rocch = Pav::from_tarnon(tar, non)?.rocch();
    Ok((rocch.eer(), rocch.auc()))
}

/// Hull area predicted from the EER when both classes are Gaussian with
/// equal variance: `Φ(√2 · Φ⁻¹(eer))`.
pub fn eer_to_auc_approx(eer: f64) -> f64 {
    probit_inv(core::f64::consts::SQRT_2 * probit(eer))
}
