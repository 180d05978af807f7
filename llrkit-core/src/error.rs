//! Structured error types for the llrkit crates.

use thiserror::Error;

/// Unified error type for all llrkit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlrError {
    /// Invalid input (length mismatch, non-finite values, out-of-range priors)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A trial set needs at least two trials and at least one of each class.
    #[error("insufficient data: need at least one target and one non-target (got {targets} targets, {nontargets} non-targets)")]
    InsufficientData {
        /// Number of class-1 trials supplied.
        targets: usize,
        /// Number of class-0 trials supplied.
        nontargets: usize,
    },

    /// Operating points were required in ascending order but were not.
    #[error("operating points must be sorted ascending (violated at index {index})")]
    UnsortedOperatingPoints {
        /// First index `i` with `plo[i] < plo[i - 1]`.
        index: usize,
    },

    /// A checked invariant failed; points at a ranking or pooling defect.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// The numerical optimizer behind calibration training failed.
    #[error("optimizer failed: {0}")]
    Optimization(String),
}

/// Convenience alias used throughout llrkit.
pub type Result<T> = std::result::Result<T, LlrError>;
