//! Equal error-rate (EER) by derivative-free maximization.
//!
//! The optimal Bayes error-rate is the lower envelope of one affine function
//! of the target prior per hull vertex, so as a function of the prior
//! probability `p = sigmoid(plo)` it is concave and piecewise linear, and
//! zero at both `p = 0` and `p = 1`. Its maximum is the EER. [`eer_search`]
//! brackets `p ∈ [0, 1]` (the whole real line of prior log-odds) and runs a
//! golden-section search on it.

use llrkit_core::logit;
use tracing::debug;

use crate::rocch::Rocch;

/// `(√5 - 1) / 2`, the golden-section shrink factor.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Settings for the golden-section EER search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EerConfig {
    /// Stop once the prior-probability bracket is narrower than this
    /// (default: 1e-10). The EER error is bounded by the same amount.
    pub tolerance: f64,
    /// Upper bound on bracket-shrinking iterations (default: 200).
    pub max_iter: usize,
}

impl Default for EerConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iter: 200,
        }
    }
}

/// Outcome of [`eer_search`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EerSearch {
    /// The equal error-rate, in `[0, 0.5]`.
    pub eer: f64,
    /// Prior log-odds at which the maximum was found.
    pub plo: f64,
    /// Number of golden-section iterations performed.
    pub iterations: usize,
}

/// Maximize the optimal Bayes error-rate of `rocch` over all operating
/// points.
///
/// # Example
///
/// ```
/// use llrkit_eval::eer::{eer_search, EerConfig};
/// use llrkit_eval::pav::Pav;
///
/// let rocch = Pav::from_tarnon(&[0.0; 4], &[0.0; 4]).unwrap().rocch();
/// let found = eer_search(&rocch, &EerConfig::default());
/// assert!((found.eer - 0.5).abs() < 1e-9);
/// ```
pub fn eer_search(rocch: &Rocch, config: &EerConfig) -> EerSearch {
    let f = |p: f64| rocch.bayes_error_rate(logit(p));

    let mut a = 0.0_f64;
    let mut b = 1.0_f64;
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    let mut iterations = 0;

    while b - a > config.tolerance && iterations < config.max_iter {
        iterations += 1;
        if fc >= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
    }

    let (p, eer) = if fc >= fd { (c, fc) } else { (d, fd) };
    debug!(eer, iterations, "EER search finished");

    EerSearch {
        eer,
        plo: logit(p),
        iterations,
    }
}
