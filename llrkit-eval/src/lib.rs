//! Evaluation of binary-classifier log-likelihood-ratio scores.
//!
//! Separates how well scores *discriminate* between targets and
//! non-targets from how well they are *calibrated* as LLRs:
//!
//! - **PAV** — [`Pav`] optimal monotonic recalibration into [`PavBlock`]s
//! - **ROC convex hull** — [`Rocch`] vertices, hull area, optimal Bayes error-rate
//! - **EER** — [`eer_search`] golden-section maximization of the optimal error-rate
//! - **Actual error-rates** — [`fast_bayes_error_rate`] with the LLRs used as-is
//! - **Cross-entropy** — [`cllr`], [`min_cllr`], [`cross_entropy_with_grad`]
//! - **Quick summaries** — [`EvalSummary`] via [`eer_cllr_min_cllr`]
//!
//! # Example
//!
//! ```
//! use llrkit_eval::{cllr, min_cllr, Pav};
//!
//! let tar = [1.5, 0.4, 2.2, -0.3];
//! let non = [-1.0, 0.1, -2.4, -0.6];
//!
//! let pav = Pav::from_tarnon(&tar, &non).unwrap();
//! let eer = pav.rocch().eer();
//! assert!(eer > 0.0 && eer < 0.5);
//!
//! // Recalibration can only help.
//! assert!(min_cllr(&pav) <= cllr(&tar, &non).unwrap());
//! ```

pub mod bayes_error;
pub mod cllr;
pub mod eer;
pub mod normal;
pub mod pav;
pub mod quick_eval;
pub mod rank;
pub mod rocch;
pub mod trials;

pub use llrkit_core::{LlrError, Result};

pub use bayes_error::{
    bayes_error_rate_analysis, default_error_rate, default_error_rates, fast_bayes_error_rate,
    ActualBayesError, BayesErrorAnalysis,
};
pub use cllr::{cllr, cross_entropy, cross_entropy_with_grad, min_cllr, CrossEntropyBackward};
pub use eer::{eer_search, EerConfig, EerSearch};
pub use pav::{Pav, PavBlock, PavLlrs};
pub use quick_eval::{
    eer_cllr_min_cllr, eer_to_auc_approx, scores_labels_eer, tarnon_auc, tarnon_eer,
    tarnon_eer_auc, tarnon_eer_cllr_min_cllr, EvalSummary,
};
pub use rocch::{BayesErrorPoint, Rocch};
pub use trials::{scores_labels_to_tarnon, tarnon_to_scores_labels};
