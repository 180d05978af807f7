//! Affine calibration and fusion of raw classifier scores into LLRs.
//!
//! - **Transform** — [`AffineTransform`] with a forward/backward split
//! - **Objective** — [`Objective`], prior-weighted logistic cross-entropy
//! - **Training** — [`train_calibration`], argmin's L-BFGS over the objective,
//!   returning a [`Calibration`]
//!
//! Calibrated scores are ordinary LLR arrays and can be evaluated with
//! `llrkit-eval`.

pub mod affine;
pub mod objective;
pub mod train;

pub use llrkit_core::{LlrError, Result};

pub use affine::{AffineBackward, AffineTransform};
pub use objective::Objective;
pub use train::{train_calibration, train_calibration_tarnon, Calibration, TrainConfig};
