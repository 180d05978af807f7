//! Affine maps from one or more score columns to a single LLR.

use llrkit_core::{Backward, LlrError, Result};

/// `llr = Σ_j weights[j] · x[j] + bias` applied to each row of a row-major
/// score matrix with `weights.len()` columns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffineTransform {
    weights: Vec<f64>,
    bias: f64,
}

impl AffineTransform {
    /// # Errors
    ///
    /// Returns [`LlrError::InvalidInput`] if `weights` is empty.
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self> {
        if weights.is_empty() {
            return Err(LlrError::InvalidInput(
                "affine transform needs at least one weight".into(),
            ));
        }
        Ok(Self { weights, bias })
    }

    /// Build from a flat parameter vector `[weights…, bias]`.
    ///
    /// # Errors
    ///
    /// Returns [`LlrError::InvalidInput`] unless `params` holds at least one
    /// weight and the bias.
    pub fn from_params(params: &[f64]) -> Result<Self> {
        match params.split_last() {
            Some((&bias, weights)) => Self::new(weights.to_vec(), bias),
            None => Err(LlrError::InvalidInput("empty parameter vector".into())),
        }
    }

    /// Flat parameters `[weights…, bias]`.
    pub fn params(&self) -> Vec<f64> {
        let mut p = self.weights.clone();
        p.push(self.bias);
        p
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Number of score columns consumed per trial.
    pub fn n_columns(&self) -> usize {
        self.weights.len()
    }

    fn check_shape(&self, scores: &[f64]) -> Result<()> {
        let k = self.weights.len();
        if scores.len() % k != 0 {
            return Err(LlrError::InvalidInput(format!(
                "{} scores do not fill rows of {} columns",
                scores.len(),
                k
            )));
        }
        Ok(())
    }

    /// Map every row of `scores` to its LLR.
    ///
    /// # Errors
    ///
    /// Returns [`LlrError::InvalidInput`] if `scores.len()` is not a multiple
    /// of [`AffineTransform::n_columns`].
    ///
    /// # Example
    ///
    /// ```
    /// use llrkit_calib::AffineTransform;
    ///
    /// let t = AffineTransform::new(vec![2.0, -1.0], 0.5).unwrap();
    /// let llr = t.apply(&[1.0, 1.0, 0.0, 3.0]).unwrap();
    /// assert_eq!(llr, vec![1.5, -2.5]);
    /// ```
    pub fn apply(&self, scores: &[f64]) -> Result<Vec<f64>> {
        self.check_shape(scores)?;
        Ok(scores
            .chunks_exact(self.weights.len())
            .map(|row| {
                row.iter()
                    .zip(&self.weights)
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + self.bias
            })
            .collect())
    }

    /// [`AffineTransform::apply`] plus the context for the gradient with
    /// respect to the parameters.
    pub fn forward(&self, scores: &[f64]) -> Result<(Vec<f64>, AffineBackward)> {
        let y = self.apply(scores)?;
        let back = AffineBackward {
            scores: scores.to_vec(),
            n_columns: self.weights.len(),
        };
        Ok((y, back))
    }
}

/// Backward context of [`AffineTransform::forward`].
///
/// Maps the per-trial upstream gradient `dy` to
/// `[Σ_i dy_i · x_i0, …, Σ_i dy_i · x_i(k-1), Σ_i dy_i]`, the layout of
/// [`AffineTransform::params`].
#[derive(Debug, Clone)]
pub struct AffineBackward {
    scores: Vec<f64>,
    n_columns: usize,
}

impl Backward for AffineBackward {
    fn backward(&self, upstream: &[f64]) -> Vec<f64> {
        debug_assert_eq!(upstream.len() * self.n_columns, self.scores.len());
        let mut grad = vec![0.0; self.n_columns + 1];
        for (row, &dy) in self.scores.chunks_exact(self.n_columns).zip(upstream) {
            for (g, x) in grad.iter_mut().zip(row) {
                *g += dy * x;
            }
            grad[self.n_columns] += dy;
        }
        grad
    }
}
