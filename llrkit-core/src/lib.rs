//! Shared primitives for the llrkit score-evaluation crates.
//!
//! `llrkit-core` provides the foundation the other llrkit crates build on:
//!
//! - **Error types** — [`LlrError`] and [`Result`] for structured error handling
//! - **Link functions** — [`sigmoid`], [`logit`], [`softplus`]
//! - **Differentiation** — the [`Backward`] trait returned alongside forward passes

pub mod error;
pub mod prob;
pub mod traits;

pub use error::{LlrError, Result};
pub use prob::{
    logit, sigmoid, sigmoid_forward, softplus, softplus_forward, SigmoidBackward,
    SoftplusBackward,
};
pub use traits::Backward;
