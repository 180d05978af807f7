//! Training an affine calibration (or fusion) of raw scores into LLRs.

use argmin::core::{Executor, State, TerminationReason};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use tracing::{debug, warn};

use llrkit_core::{LlrError, Result};

use crate::affine::AffineTransform;
use crate::objective::Objective;

/// Settings for the L-BFGS solver behind [`train_calibration`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainConfig {
    /// Maximum number of quasi-Newton iterations (default: 200).
    pub max_iter: usize,
    /// Converged once the Euclidean norm of the gradient is at most this
    /// (default: 1e-6).
    pub tolerance: f64,
    /// Number of curvature pairs kept by L-BFGS (default: 10).
    pub history: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tolerance: 1e-6,
            history: 10,
        }
    }
}

fn validate_config(config: &TrainConfig) -> Result<()> {
    if config.max_iter == 0 {
        return Err(LlrError::InvalidInput("max_iter must be at least 1".into()));
    }
    if !(config.tolerance >= 0.0) {
        return Err(LlrError::InvalidInput(format!(
            "tolerance must be non-negative, got {}",
            config.tolerance
        )));
    }
    if config.history == 0 {
        return Err(LlrError::InvalidInput("history must be at least 1".into()));
    }
    Ok(())
}

/// A fitted calibration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    /// The fitted score-to-LLR map.
    pub transform: AffineTransform,
    /// Final objective: the normalized cross-entropy of the calibrated
    /// training scores at the training prior, in bits.
    pub objective: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl Calibration {
    /// Fitted parameters `[weights…, bias]`.
    pub fn params(&self) -> Vec<f64> {
        self.transform.params()
    }

    /// Calibrate a row-major score matrix with the fitted transform.
    pub fn apply(&self, scores: &[f64]) -> Result<Vec<f64>> {
        self.transform.apply(scores)
    }
}

/// Fit `llr = Σ_j w_j · x_j + b` to labelled trials by minimizing the
/// prior-weighted logistic cross-entropy at target prior `ptar`.
///
/// `scores` is a row-major matrix with `n_columns` columns, one per
/// upstream system; with more than one column this is linear score fusion.
/// The search starts from equal weights `1 / n_columns` and zero bias and
/// runs argmin's L-BFGS with a More-Thuente line search. Hitting
/// `config.max_iter` is not an error: the best iterate is returned with
/// `converged == false`.
///
/// # Errors
///
/// Returns [`LlrError::InvalidInput`] for a prior outside `(0, 1)`, an
/// empty or mis-shaped score matrix, a non-finite score, or an invalid
/// config; and [`LlrError::InsufficientData`] unless both classes are
/// present. Solver failures surface as [`LlrError::Optimization`].
///
/// # Example
///
/// ```
/// use llrkit_calib::{train_calibration, TrainConfig};
///
/// let scores = [2.0, 3.5, 1.0, 4.0, 0.5, -1.0, 1.5, -2.0];
/// let labels = [true, true, true, true, false, false, false, false];
/// let cal = train_calibration(&scores, 1, &labels, 0.5, &TrainConfig::default()).unwrap();
/// assert!(cal.transform.weights()[0] > 0.0);
/// assert!(cal.objective < 1.0);
/// ```
pub fn train_calibration(
    scores: &[f64],
    n_columns: usize,
    labels: &[bool],
    ptar: f64,
    config: &TrainConfig,
) -> Result<Calibration> {
    validate_config(config)?;
    let objective = Objective::new(scores, n_columns, labels, ptar)?;

    let mut x0 = vec![1.0 / n_columns as f64; n_columns];
    x0.push(0.0);

    let solver = LBFGS::new(MoreThuenteLineSearch::new(), config.history)
        .with_tolerance_grad(config.tolerance)
        .map_err(optimization_error)?;
    let res = Executor::new(objective, solver)
        .configure(|state| state.param(x0).max_iters(config.max_iter as u64))
        .run()
        .map_err(optimization_error)?;

    let state = res.state();
    let params = state
        .get_best_param()
        .ok_or_else(|| LlrError::Optimization("solver returned no parameters".into()))?;
    let transform = AffineTransform::from_params(params)?;
    let value = state.get_best_cost();
    let iterations = state.get_iter() as usize;
    let converged = matches!(
        state.get_termination_reason(),
        Some(TerminationReason::SolverConverged)
    );

    debug!(
        trials = labels.len(),
        columns = n_columns,
        iterations,
        objective = value,
        converged,
        "calibration trained"
    );
    if !converged {
        warn!(
            iterations,
            objective = value,
            reason = ?state.get_termination_reason(),
            "calibration stopped before converging"
        );
    }

    Ok(Calibration {
        transform,
        objective: value,
        iterations,
        converged,
    })
}

fn optimization_error(err: argmin::core::Error) -> LlrError {
    match err.downcast::<LlrError>() {
        Ok(inner) => inner,
        Err(other) => LlrError::Optimization(other.to_string()),
    }
}

/// Single-column [`train_calibration`] on separate target and non-target
/// scores.
pub fn train_calibration_tarnon(
    tar: &[f64],
    non: &[f64],
    ptar: f64,
    config: &TrainConfig,
) -> Result<Calibration> {
    let mut scores = Vec::with_capacity(tar.len() + non.len());
    scores.extend_from_slice(tar);
    scores.extend_from_slice(non);
    let mut labels = vec![true; tar.len()];
    labels.resize(scores.len(), false);
    train_calibration(&scores, 1, &labels, ptar, config)
}

// ── Tests ──────────────────────────────────────────────────────────────────
