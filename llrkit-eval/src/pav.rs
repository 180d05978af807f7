//! Pool-adjacent-violators (PAV) isotonic fit of labelled scores.
//!
//! [`Pav::fit`] sorts the trials by score and finds the non-decreasing step
//! function of posterior P(target | score) that best fits the 0/1 labels in
//! the least-squares sense. Each step is a [`PavBlock`]. The fit is the
//! optimal monotonic score-to-LLR calibration for the given labels, and its
//! blocks are exactly the vertices of the ROC convex hull (see
//! [`crate::rocch::Rocch`]).
//!
//! Ties are broken pessimistically: among equal scores, targets are ordered
//! *below* non-targets, so a tie that straddles the classes is always
//! pooled into a single block instead of being resolved in the classifier's
//! favour.

use core::cmp::Ordering;

use llrkit_core::{logit, LlrError, Result};
use tracing::debug;

use crate::rocch::Rocch;
use crate::trials::{tarnon_to_scores_labels, validate_trials};

/// One step of the PAV solution: a maximal run of sorted trials sharing a
/// single pooled posterior.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PavBlock {
    /// Lowest score in the block.
    pub low: f64,
    /// Highest score in the block.
    pub high: f64,
    /// Number of trials pooled into the block.
    pub count: usize,
    /// Number of target (class 1) trials in the block.
    pub targets: usize,
    /// Number of non-target (class 0) trials in the block.
    pub nontargets: usize,
    /// Pooled posterior `targets / count`.
    pub p: f64,
}

/// Per-block LLRs with the class counts that weight them.
#[derive(Debug, Clone, PartialEq)]
pub struct PavLlrs {
    /// `logit(p) - ln(T / N)` for each block; may be `±∞` at the ends.
    pub llr: Vec<f64>,
    /// Target count per block.
    pub targets: Vec<usize>,
    /// Non-target count per block.
    pub nontargets: Vec<usize>,
}

/// A fitted PAV model: ordered blocks plus the class totals.
///
/// Block posteriors strictly increase, block score ranges are ordered and
/// disjoint, and the per-block class counts sum to the totals. The model is
/// immutable once fitted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PavParts"))]
pub struct Pav {
    blocks: Vec<PavBlock>,
    targets: usize,
    nontargets: usize,
}

/// Unchecked wire form of [`Pav`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PavParts {
    blocks: Vec<PavBlock>,
    targets: usize,
    nontargets: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<PavParts> for Pav {
    type Error = LlrError;

    fn try_from(parts: PavParts) -> Result<Self> {
        Pav::from_blocks(parts.blocks, parts.targets, parts.nontargets)
    }
}

/// A run of pooled trials on the PAV stack. Means are kept as exact integer
/// ratios `targets / count`.
#[derive(Debug, Clone, Copy)]
struct Pool {
    start: usize,
    count: usize,
    targets: usize,
}

impl Pool {
    /// `self.mean() >= other.mean()` without rounding.
    fn mean_ge(&self, other: &Pool) -> bool {
        (self.targets as u128) * (other.count as u128)
            >= (other.targets as u128) * (self.count as u128)
    }
}

/// Composite sort key: score ascending, then targets before non-targets.
fn trial_order(scores: &[f64], labels: &[bool], a: usize, b: usize) -> Ordering {
    scores[a]
        .partial_cmp(&scores[b])
        .unwrap_or(Ordering::Equal)
        .then_with(|| labels[b].cmp(&labels[a]))
}

impl Pav {
    /// Fit the PAV model to labelled scores (`true` = target).
    ///
    /// # Errors
    ///
    /// Returns [`LlrError::InsufficientData`] unless both classes are
    /// present, [`LlrError::InvalidInput`] on length mismatch or NaN scores,
    /// and [`LlrError::InternalConsistency`] if the recovered per-block
    /// counts do not reproduce the pooled posteriors and class totals.
    ///
    /// # Example
    ///
    /// ```
    /// use llrkit_eval::pav::Pav;
    ///
    /// let scores = [0.0, 1.0, 1.0, 2.0, 3.0];
    /// let labels = [false, true, false, true, true];
    /// let pav = Pav::fit(&scores, &labels).unwrap();
    /// assert_eq!(pav.n_blocks(), 3);
    /// assert_eq!(pav.blocks()[1].p, 0.5);
    /// ```
    pub fn fit(scores: &[f64], labels: &[bool]) -> Result<Self> {
        let (n_tar, n_non) = validate_trials(scores, labels)?;
        let n = scores.len();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| trial_order(scores, labels, a, b));

        // Stack-based PAV with unit weights. Pools with equal means are
        // merged as well, so the surviving means strictly increase.
        let mut stack: Vec<Pool> = Vec::new();
        for (pos, &idx) in order.iter().enumerate() {
            stack.push(Pool {
                start: pos,
                count: 1,
                targets: usize::from(labels[idx]),
            });
            while stack.len() >= 2 {
                let last = stack[stack.len() - 1];
                let prev = stack[stack.len() - 2];
                if !prev.mean_ge(&last) {
                    break;
                }
                stack.pop();
                let merged = stack.len() - 1;
                stack[merged].count += last.count;
                stack[merged].targets += last.targets;
            }
        }

        let blocks: Vec<PavBlock> = stack
            .iter()
            .map(|pool| {
                let p = pool.targets as f64 / pool.count as f64;
                PavBlock {
                    low: scores[order[pool.start]],
                    high: scores[order[pool.start + pool.count - 1]],
                    count: pool.count,
                    targets: pool.targets,
                    nontargets: pool.count - pool.targets,
                    p,
                }
            })
            .collect();

        let pav = Self {
            blocks,
            targets: n_tar,
            nontargets: n_non,
        };
        pav.check_counts()?;

        debug!(
            n,
            targets = n_tar,
            nontargets = n_non,
            blocks = pav.blocks.len(),
            "fitted PAV model"
        );
        Ok(pav)
    }

    /// Fit from separate target and non-target score arrays.
    ///
    /// # Errors
    ///
    /// Same as [`Pav::fit`].
    pub fn from_tarnon(tar: &[f64], non: &[f64]) -> Result<Self> {
        let (scores, labels) = tarnon_to_scores_labels(tar, non);
        Self::fit(&scores, &labels)
    }

    /// Rebuild a model from stored blocks and class totals.
    ///
    /// # Errors
    ///
    /// Returns [`LlrError::InsufficientData`] unless both totals are
    /// non-zero; [`LlrError::InvalidInput`] for an empty block list, an
    /// empty block, per-block counts that do not add up, or score ranges
    /// that are not ordered and disjoint; and
    /// [`LlrError::InternalConsistency`] if the posteriors do not match the
    /// counts, do not strictly increase, or the counts miss the totals.
    pub fn from_blocks(blocks: Vec<PavBlock>, targets: usize, nontargets: usize) -> Result<Self> {
        if targets == 0 || nontargets == 0 {
            return Err(LlrError::InsufficientData {
                targets,
                nontargets,
            });
        }
        if blocks.is_empty() {
            return Err(LlrError::InvalidInput("no PAV blocks".into()));
        }
        let mut prev_high = f64::NEG_INFINITY;
        for (k, block) in blocks.iter().enumerate() {
            if block.count == 0 || block.targets + block.nontargets != block.count {
                return Err(LlrError::InvalidInput(format!(
                    "block {}: {} targets + {} non-targets != count {}",
                    k, block.targets, block.nontargets, block.count
                )));
            }
            let ordered = block.low <= block.high && (k == 0 || block.low > prev_high);
            if !ordered {
                return Err(LlrError::InvalidInput(format!(
                    "block {}: score range [{}, {}] is not ordered after {}",
                    k, block.low, block.high, prev_high
                )));
            }
            prev_high = block.high;
        }

        let pav = Self {
            blocks,
            targets,
            nontargets,
        };
        pav.check_counts()?;
        Ok(pav)
    }

    /// Recover integer class counts from `count × p` and verify them against
    /// the pooled posteriors and the class totals.
    fn check_counts(&self) -> Result<()> {
        let mut sum_tar = 0usize;
        let mut sum_non = 0usize;
        let mut prev_p = f64::NEG_INFINITY;

        for (k, block) in self.blocks.iter().enumerate() {
            let recovered = (block.count as f64 * block.p).round();
            if recovered != block.targets as f64 {
                return Err(LlrError::InternalConsistency(format!(
                    "block {}: count {} × p {} does not recover {} targets",
                    k, block.count, block.p, block.targets
                )));
            }
            if block.p <= prev_p {
                return Err(LlrError::InternalConsistency(format!(
                    "block {}: posterior {} does not exceed previous {}",
                    k, block.p, prev_p
                )));
            }
            prev_p = block.p;
            sum_tar += recovered as usize;
            sum_non += block.count - recovered as usize;
        }

        if sum_tar != self.targets || sum_non != self.nontargets {
            return Err(LlrError::InternalConsistency(format!(
                "recovered counts ({}, {}) != totals ({}, {})",
                sum_tar, sum_non, self.targets, self.nontargets
            )));
        }
        Ok(())
    }

    /// The PAV blocks in ascending score order.
    pub fn blocks(&self) -> &[PavBlock] {
        &self.blocks
    }

    /// Number of PAV blocks.
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Total number of target trials, `T`.
    pub fn n_targets(&self) -> usize {
        self.targets
    }

    /// Total number of non-target trials, `N`.
    pub fn n_nontargets(&self) -> usize {
        self.nontargets
    }

    /// Log of the empirical prior odds, `ln(T / N)`.
    pub fn empirical_log_odds(&self) -> f64 {
        (self.targets as f64 / self.nontargets as f64).ln()
    }

    /// LLR of each block: the pooled posterior log-odds with the empirical
    /// prior log-odds removed.
    pub fn llrs(&self) -> PavLlrs {
        let prior = self.empirical_log_odds();
        PavLlrs {
            llr: self.blocks.iter().map(|b| logit(b.p) - prior).collect(),
            targets: self.blocks.iter().map(|b| b.targets).collect(),
            nontargets: self.blocks.iter().map(|b| b.nontargets).collect(),
        }
    }

    /// Score → LLR step function as plottable point pairs.
    ///
    /// Returns `2 × n_blocks` scores alternating each block's low and high
    /// score, and the block LLR duplicated alongside. Joining the points
    /// gives a staircase of horizontal and vertical segments; the first and
    /// last LLRs may be `-∞` and `+∞`.
    pub fn scores_vs_llrs(&self) -> (Vec<f64>, Vec<f64>) {
        let llrs = self.llrs().llr;
        let mut scores = Vec::with_capacity(2 * self.blocks.len());
        let mut steps = Vec::with_capacity(2 * self.blocks.len());
        for (block, llr) in self.blocks.iter().zip(llrs) {
            scores.push(block.low);
            scores.push(block.high);
            steps.push(llr);
            steps.push(llr);
        }
        (scores, steps)
    }

    /// The ROC convex hull of this fit.
    pub fn rocch(&self) -> Rocch {
        Rocch::from_pav(self)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
