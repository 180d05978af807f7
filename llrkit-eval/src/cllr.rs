//! Cross-entropy evaluation of LLR scores: Cllr and minCllr.
//!
//! - [`cross_entropy`] — prior-weighted binary cross-entropy in bits,
//!   normalized so that all-zero LLRs score exactly 1
//! - [`cllr`] — the same at `ptar = 0.5`
//! - [`min_cllr`] — Cllr after optimal monotonic recalibration via PAV,
//!   which isolates discrimination from calibration
//!
//! `cllr - min_cllr` is the calibration loss of the scores.

use core::f64::consts::LN_2;

use llrkit_core::{logit, softplus, softplus_forward, Backward, LlrError, Result, SoftplusBackward};

use crate::pav::Pav;

fn check_prior(ptar: f64) -> Result<()> {
    if !(ptar > 0.0 && ptar < 1.0) {
        return Err(LlrError::InvalidInput(format!(
            "target prior must be in (0, 1), got {}",
            ptar
        )));
    }
    Ok(())
}

fn check_scores(tar: &[f64], non: &[f64]) -> Result<()> {
    if tar.is_empty() || non.is_empty() {
        return Err(LlrError::InsufficientData {
            targets: tar.len(),
            nontargets: non.len(),
        });
    }
    if tar.iter().chain(non).any(|s| s.is_nan()) {
        return Err(LlrError::InvalidInput("NaN score".into()));
    }
    Ok(())
}

/// Normalized prior-weighted cross-entropy of target and non-target LLRs.
///
/// ```text
/// Ptar · mean(softplus(-tar - logit(Ptar))) + (1 - Ptar) · mean(softplus(non + logit(Ptar)))
/// ------------------------------------------------------------------------------------------
///                                         ln 2
/// ```
///
/// # Errors
///
/// Returns an error if either array is empty, a score is NaN, or `ptar` is
/// outside `(0, 1)`.
pub fn cross_entropy(tar: &[f64], non: &[f64], ptar: f64) -> Result<f64> {
    check_prior(ptar)?;
    check_scores(tar, non)?;

    let lp = logit(ptar);
    let t = tar.iter().map(|&s| softplus(-s - lp)).sum::<f64>() / tar.len() as f64;
    let n = non.iter().map(|&s| softplus(s + lp)).sum::<f64>() / non.len() as f64;
    Ok((ptar * t + (1.0 - ptar) * n) / LN_2)
}

/// Backward context of [`cross_entropy_with_grad`].
///
/// As a [`Backward`] it takes the one-element upstream gradient of the
/// scalar loss and returns the gradient for the target scores followed by
/// the non-target scores, the layout of
/// [`crate::trials::tarnon_to_scores_labels`].
#[derive(Debug, Clone)]
pub struct CrossEntropyBackward {
    n_tar: usize,
    n_non: usize,
    k_tar: f64,
    k_non: f64,
    tar_grad: SoftplusBackward,
    non_grad: SoftplusBackward,
}

impl CrossEntropyBackward {
    /// Gradients with respect to the target and non-target scores, scaled by
    /// the upstream gradient `dy` of the loss.
    pub fn backward_split(&self, dy: f64) -> (Vec<f64>, Vec<f64>) {
        let dtar = self.tar_grad.backward(&vec![-dy * self.k_tar; self.n_tar]);
        let dnon = self.non_grad.backward(&vec![dy * self.k_non; self.n_non]);
        (dtar, dnon)
    }
}

impl Backward for CrossEntropyBackward {
    fn backward(&self, upstream: &[f64]) -> Vec<f64> {
        let dy = upstream.first().copied().unwrap_or(0.0);
        let (mut grad, dnon) = self.backward_split(dy);
        grad.extend(dnon);
        grad
    }
}

/// [`cross_entropy`] together with a backward context for its gradient with
/// respect to every score.
///
/// # Errors
///
/// Same as [`cross_entropy`].
pub fn cross_entropy_with_grad(
    tar: &[f64],
    non: &[f64],
    ptar: f64,
) -> Result<(f64, CrossEntropyBackward)> {
    check_prior(ptar)?;
    check_scores(tar, non)?;

    let lp = logit(ptar);
    let tar_in: Vec<f64> = tar.iter().map(|&s| -s - lp).collect();
    let non_in: Vec<f64> = non.iter().map(|&s| s + lp).collect();
    let (t, tar_grad) = softplus_forward(&tar_in);
    let (n, non_grad) = softplus_forward(&non_in);

    let k_tar = ptar / (tar.len() as f64 * LN_2);
    let k_non = (1.0 - ptar) / (non.len() as f64 * LN_2);
    let y = k_tar * t.iter().sum::<f64>() + k_non * n.iter().sum::<f64>();

    Ok((
        y,
        CrossEntropyBackward {
            n_tar: tar.len(),
            n_non: non.len(),
            k_tar,
            k_non,
            tar_grad,
            non_grad,
        },
    ))
}

/// Cllr: [`cross_entropy`] at `ptar = 0.5`.
///
/// All-zero scores give exactly 1; perfectly separating, well-calibrated
/// scores approach 0.
///
/// # Example
///
/// ```
/// use llrkit_eval::cllr::cllr;
///
/// assert!((cllr(&[0.0, 0.0], &[0.0]).unwrap() - 1.0).abs() < 1e-15);
/// ```
pub fn cllr(tar: &[f64], non: &[f64]) -> Result<f64> {
    cross_entropy(tar, non, 0.5)
}

/// minCllr: Cllr of the PAV-recalibrated scores.
///
/// Every trial takes the LLR of its PAV block, and the block costs are
/// weighted by the block class counts. Zero counts are skipped, so the
/// infinite LLRs of pure single-class end blocks never produce `0 × ∞`.
pub fn min_cllr(pav: &Pav) -> f64 {
    let llrs = pav.llrs();
    let mut tar_cost = 0.0;
    let mut non_cost = 0.0;
    for ((&llr, &t), &n) in llrs.llr.iter().zip(&llrs.targets).zip(&llrs.nontargets) {
        if t > 0 {
            tar_cost += softplus(-llr) * t as f64;
        }
        if n > 0 {
            non_cost += softplus(llr) * n as f64;
        }
    }
    let t = pav.n_targets() as f64;
    let n = pav.n_nontargets() as f64;
    (tar_cost / t + non_cost / n) / (2.0 * LN_2)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn zero_scores_give_one() {
        assert!((cllr(&[0.0; 4], &[0.0; 4]).unwrap() - 1.0).abs() < 1e-15);
        assert!((cross_entropy(&[0.0; 3], &[0.0; 5], 0.5).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn zero_scores_give_prior_entropy() {
        for &p in &[0.01, 0.2, 0.7] {
            let ce = cross_entropy(&[0.0; 2], &[0.0; 3], p).unwrap();
            let h = -(p * p.log2() + (1.0 - p) * (1.0 - p).log2());
            assert!((ce - h).abs() < 1e-12);
        }
    }

    #[test]
    fn confident_correct_scores_near_zero() {
        let c = cllr(&[40.0, 50.0], &[-40.0, -45.0]).unwrap();
        assert!(c < 1e-15);
    }

    #[test]
    fn confident_wrong_scores_large() {
        let c = cllr(&[-10.0], &[10.0]).unwrap();
        assert!(c > 10.0);
    }

    #[test]
    fn infinite_scores() {
        assert_eq!(cllr(&[f64::INFINITY], &[f64::NEG_INFINITY]).unwrap(), 0.0);
        assert_eq!(cllr(&[f64::NEG_INFINITY], &[0.0]).unwrap(), f64::INFINITY);
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(
            cllr(&[], &[0.0]),
            Err(LlrError::InsufficientData { .. })
        ));
        assert!(matches!(
            cross_entropy(&[0.0], &[0.0], 1.0),
            Err(LlrError::InvalidInput(_))
        ));
        assert!(matches!(
            cross_entropy(&[0.0], &[0.0], f64::NAN),
            Err(LlrError::InvalidInput(_))
        ));
        assert!(matches!(
            cllr(&[f64::NAN], &[0.0]),
            Err(LlrError::InvalidInput(_))
        ));
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let tar = [1.2, -0.4, 2.0];
        let non = [-1.0, 0.3];
        let ptar = 0.3;
        let (y, back) = cross_entropy_with_grad(&tar, &non, ptar).unwrap();
        assert!((y - cross_entropy(&tar, &non, ptar).unwrap()).abs() < TOL);

        let grad = back.backward(&[1.0]);
        assert_eq!(grad.len(), 5);

        let h = 1e-6;
        for i in 0..tar.len() {
            let mut up = tar;
            let mut down = tar;
            up[i] += h;
            down[i] -= h;
            let fd = (cross_entropy(&up, &non, ptar).unwrap()
                - cross_entropy(&down, &non, ptar).unwrap())
                / (2.0 * h);
            assert!((grad[i] - fd).abs() < 1e-7);
            assert!(grad[i] < 0.0);
        }
        for j in 0..non.len() {
            let mut up = non;
            let mut down = non;
            up[j] += h;
            down[j] -= h;
            let fd = (cross_entropy(&tar, &up, ptar).unwrap()
                - cross_entropy(&tar, &down, ptar).unwrap())
                / (2.0 * h);
            assert!((grad[3 + j] - fd).abs() < 1e-7);
            assert!(grad[3 + j] > 0.0);
        }
    }

    #[test]
    fn backward_split_scales_with_upstream() {
        let (_, back) = cross_entropy_with_grad(&[0.5], &[-0.5, 0.1], 0.5).unwrap();
        let (t1, n1) = back.backward_split(1.0);
        let (t2, n2) = back.backward_split(2.0);
        assert_eq!(n1.len(), 2);
        assert!((t2[0] - 2.0 * t1[0]).abs() < TOL);
        assert!((n2[1] - 2.0 * n1[1]).abs() < TOL);
    }

    #[test]
    fn min_cllr_separable_is_zero() {
        let pav = Pav::from_tarnon(&[1.0, 1.0, 1.0], &[-1.0, -1.0, -1.0]).unwrap();
        assert!(min_cllr(&pav).abs() < TOL);
    }

    #[test]
    fn min_cllr_tied_is_one() {
        let pav = Pav::from_tarnon(&[0.0; 4], &[0.0; 4]).unwrap();
        assert!((min_cllr(&pav) - 1.0).abs() < TOL);
    }

    #[test]
    fn min_cllr_equals_cllr_of_block_llrs() {
        let tar = [1.2, 0.4, 2.0, -0.1, 0.9];
        let non = [-1.0, 0.3, 0.5, -2.2];
        let pav = Pav::from_tarnon(&tar, &non).unwrap();
        let llrs = pav.llrs();

        let mut cal_tar = Vec::new();
        let mut cal_non = Vec::new();
        for k in 0..llrs.llr.len() {
            cal_tar.extend(std::iter::repeat(llrs.llr[k]).take(llrs.targets[k]));
            cal_non.extend(std::iter::repeat(llrs.llr[k]).take(llrs.nontargets[k]));
        }
        let expected = cllr(&cal_tar, &cal_non).unwrap();
        assert!((min_cllr(&pav) - expected).abs() < 1e-12);
    }

    #[test]
    fn min_cllr_below_cllr() {
        let tar = [1.2, 0.4, 2.0, -0.1, 0.9];
        let non = [-1.0, 0.3, 0.5, -2.2];
        let pav = Pav::from_tarnon(&tar, &non).unwrap();
        assert!(min_cllr(&pav) <= cllr(&tar, &non).unwrap());
    }
}
