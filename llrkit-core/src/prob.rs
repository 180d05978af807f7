//! Numerically stable link functions between probabilities and log-odds.
//!
//! The scalar functions [`sigmoid`], [`logit`] and [`softplus`] accept the
//! full extended real line: `±∞` inputs map to their limits rather than NaN.
//! [`sigmoid_forward`] and [`softplus_forward`] evaluate a whole slice and
//! hand back a [`Backward`] context for gradient propagation.

use crate::traits::Backward;

/// Logistic sigmoid: `1 / (1 + exp(-x))`.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Log-odds of a probability: `ln(p / (1 - p))`.
///
/// `logit(0) = -∞`, `logit(0.5) = 0` exactly, and `logit(1) = +∞`.
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Softplus: `ln(1 + exp(x))`, evaluated without overflow.
///
/// Equivalently `-ln(sigmoid(-x))`, which makes it the per-trial
/// cross-entropy cost of a log-odds value.
pub fn softplus(x: f64) -> f64 {
    (-x.abs()).exp().ln_1p() + x.max(0.0)
}

/// Cached `sigmoid(x) · sigmoid(-x)` for each input of [`sigmoid_forward`].
#[derive(Debug, Clone)]
pub struct SigmoidBackward {
    slope: Vec<f64>,
}

impl Backward for SigmoidBackward {
    fn backward(&self, upstream: &[f64]) -> Vec<f64> {
        debug_assert_eq!(upstream.len(), self.slope.len());
        upstream.iter().zip(&self.slope).map(|(dy, s)| dy * s).collect()
    }
}

/// Element-wise sigmoid with its backward context.
pub fn sigmoid_forward(x: &[f64]) -> (Vec<f64>, SigmoidBackward) {
    let mut y = Vec::with_capacity(x.len());
    let mut slope = Vec::with_capacity(x.len());
    for &xi in x {
        let p = sigmoid(xi);
        y.push(p);
        slope.push(p * sigmoid(-xi));
    }
    (y, SigmoidBackward { slope })
}

/// Cached `sigmoid(x)` (the softplus derivative) for each input of
/// [`softplus_forward`].
#[derive(Debug, Clone)]
pub struct SoftplusBackward {
    slope: Vec<f64>,
}

impl Backward for SoftplusBackward {
    fn backward(&self, upstream: &[f64]) -> Vec<f64> {
        debug_assert_eq!(upstream.len(), self.slope.len());
        upstream.iter().zip(&self.slope).map(|(dy, s)| dy * s).collect()
    }
}

/// Element-wise softplus with its backward context.
pub fn softplus_forward(x: &[f64]) -> (Vec<f64>, SoftplusBackward) {
    let y = x.iter().map(|&xi| softplus(xi)).collect();
    let slope = x.iter().map(|&xi| sigmoid(xi)).collect();
    (y, SoftplusBackward { slope })
}
