//! Prior-weighted logistic cross-entropy of an affine calibration.
//!
//! For parameters `θ = [weights…, bias]` and trial LLRs `y_i = f_θ(x_i)`:
//!
//! ```text
//! C(θ) = Σ_i w_i · softplus(s_i · (logit(ptar) + y_i))
//! ```
//!
//! with `s_i = -1, w_i = ptar / (T ln 2)` for targets and
//! `s_i = +1, w_i = (1 - ptar) / (N ln 2)` for non-targets. `C` is the
//! normalized cross-entropy of the calibrated scores in bits, convex in `θ`.

use core::f64::consts::LN_2;

use argmin::core::{CostFunction, Error as ArgminError, Gradient};
use llrkit_core::{logit, softplus_forward, Backward, LlrError, Result};

use crate::affine::AffineTransform;

/// Borrowed trial set plus the prior, ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct Objective<'a> {
    scores: &'a [f64],
    n_columns: usize,
    labels: &'a [bool],
    prior_log_odds: f64,
    k_tar: f64,
    k_non: f64,
}

impl<'a> Objective<'a> {
    /// # Errors
    ///
    /// Returns [`LlrError::InvalidInput`] if `ptar` is outside `(0, 1)`,
    /// `n_columns` is zero, the score matrix does not have one row per label,
    /// or a score is not finite; and [`LlrError::InsufficientData`] unless
    /// both classes are present.
    pub fn new(
        scores: &'a [f64],
        n_columns: usize,
        labels: &'a [bool],
        ptar: f64,
    ) -> Result<Self> {
        if !(ptar > 0.0 && ptar < 1.0) {
            return Err(LlrError::InvalidInput(format!(
                "target prior must be in (0, 1), got {}",
                ptar
            )));
        }
        if n_columns == 0 {
            return Err(LlrError::InvalidInput("zero score columns".into()));
        }
        if labels.is_empty() || scores.len() != labels.len() * n_columns {
            return Err(LlrError::InvalidInput(format!(
                "{} scores do not form {} rows of {} columns",
                scores.len(),
                labels.len(),
                n_columns
            )));
        }
        if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
            return Err(LlrError::InvalidInput(format!(
                "score at index {} is not finite",
                i
            )));
        }

        let targets = labels.iter().filter(|&&l| l).count();
        let nontargets = labels.len() - targets;
        if targets == 0 || nontargets == 0 {
            return Err(LlrError::InsufficientData {
                targets,
                nontargets,
            });
        }

        Ok(Self {
            scores,
            n_columns,
            labels,
            prior_log_odds: logit(ptar),
            k_tar: ptar / (targets as f64 * LN_2),
            k_non: (1.0 - ptar) / (nontargets as f64 * LN_2),
        })
    }

    /// Number of parameters: one weight per column plus the bias.
    pub fn n_params(&self) -> usize {
        self.n_columns + 1
    }

    /// Objective value and its gradient with respect to `params`.
    ///
    /// # Errors
    ///
    /// Returns [`LlrError::InvalidInput`] if `params` does not have
    /// [`Objective::n_params`] entries.
    pub fn value_and_grad(&self, params: &[f64]) -> Result<(f64, Vec<f64>)> {
        if params.len() != self.n_params() {
            return Err(LlrError::InvalidInput(format!(
                "expected {} parameters, got {}",
                self.n_params(),
                params.len()
            )));
        }
        let transform = AffineTransform::from_params(params)?;
        let (llr, affine_back) = transform.forward(self.scores)?;

        let mut z = Vec::with_capacity(llr.len());
        let mut weight = Vec::with_capacity(llr.len());
        for (&y, &is_target) in llr.iter().zip(self.labels) {
            if is_target {
                z.push(-(self.prior_log_odds + y));
                weight.push(-self.k_tar);
            } else {
                z.push(self.prior_log_odds + y);
                weight.push(self.k_non);
            }
        }

        let (cost, softplus_back) = softplus_forward(&z);
        let value = cost
            .iter()
            .zip(&weight)
            .map(|(c, w)| c * w.abs())
            .sum::<f64>();

        // `weight` carries s_i · w_i, the chain factor dC/dz_i · dz_i/dy_i.
        let dy = softplus_back.backward(&weight);
        Ok((value, affine_back.backward(&dy)))
    }
}

impl CostFunction for Objective<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<f64, ArgminError> {
        Ok(self.value_and_grad(params)?.0)
    }
}

impl Gradient for Objective<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, params: &Self::Param) -> std::result::Result<Vec<f64>, ArgminError> {
        Ok(self.value_and_grad(params)?.1)
    }
}
