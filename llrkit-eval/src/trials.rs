//! Trial-set validation and conversion between score layouts.
//!
//! Scores arrive either as one array with parallel boolean labels
//! (`true` = target, class 1) or as separate target / non-target arrays.

use llrkit_core::{LlrError, Result};

/// Check a labelled trial set and return `(targets, nontargets)`.
///
/// # Errors
///
/// Returns [`LlrError::InvalidInput`] if the slices differ in length or any
/// score is NaN, and [`LlrError::InsufficientData`] unless both classes are
/// present.
pub fn validate_trials(scores: &[f64], labels: &[bool]) -> Result<(usize, usize)> {
    if scores.len() != labels.len() {
        return Err(LlrError::InvalidInput(format!(
            "scores length {} != labels length {}",
            scores.len(),
            labels.len()
        )));
    }
    if let Some(i) = scores.iter().position(|s| s.is_nan()) {
        return Err(LlrError::InvalidInput(format!("score at index {} is NaN", i)));
    }

    let targets = labels.iter().filter(|&&l| l).count();
    let nontargets = labels.len() - targets;
    if targets == 0 || nontargets == 0 {
        return Err(LlrError::InsufficientData {
            targets,
            nontargets,
        });
    }
    Ok((targets, nontargets))
}

/// Concatenate target and non-target scores, targets first, with matching
/// labels.
pub fn tarnon_to_scores_labels(tar: &[f64], non: &[f64]) -> (Vec<f64>, Vec<bool>) {
    let mut scores = Vec::with_capacity(tar.len() + non.len());
    scores.extend_from_slice(tar);
    scores.extend_from_slice(non);

    let mut labels = vec![false; scores.len()];
    labels[..tar.len()].fill(true);
    (scores, labels)
}

/// Split labelled scores into `(targets, non_targets)`, preserving order.
///
/// # Errors
///
/// Returns an error if the slices differ in length.
pub fn scores_labels_to_tarnon(scores: &[f64], labels: &[bool]) -> Result<(Vec<f64>, Vec<f64>)> {
    if scores.len() != labels.len() {
        return Err(LlrError::InvalidInput(format!(
            "scores length {} != labels length {}",
            scores.len(),
            labels.len()
        )));
    }
    let mut tar = Vec::new();
    let mut non = Vec::new();
    for (&s, &l) in scores.iter().zip(labels) {
        if l {
            tar.push(s);
        } else {
            non.push(s);
        }
    }
    Ok((tar, non))
}
