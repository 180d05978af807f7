//! Core trait definitions for the llrkit crates.

/// Reverse-mode half of a differentiable operation.
///
/// Forward functions return their output together with a value implementing
/// this trait. That value owns whatever the forward pass cached, and maps an
/// upstream gradient (d objective / d output) to the gradient with respect to
/// the operation's input or parameters.
pub trait Backward {
    /// Propagate `upstream` back through the operation.
    ///
    /// `upstream` must have one entry per forward output.
    fn backward(&self, upstream: &[f64]) -> Vec<f64>;
}
