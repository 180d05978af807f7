//! Ordinal ranking of numeric data.
//!
//! Provides [`ordinal_rank`], which assigns every value a distinct rank and
//! breaks ties by encounter order. The fast Bayes error-rate evaluator uses
//! this to place thresholds inside a jointly sorted score list.

/// Ordinal ranks (1-based) of `data`.
///
/// Values are compared with [`f64::total_cmp`] after normalising `-0.0` to
/// `0.0`, so signed zeros tie. Tied values receive sequential ranks in the
/// order they appear in `data`: an earlier element always ranks lower than a
/// later element with the same value.
///
/// Empty input produces empty output.
pub fn ordinal_rank(data: &[f64]) -> Vec<usize> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    // Build (value, original_index) and stable-sort by value.
    let mut indexed: Vec<(f64, usize)> = data
        .iter()
        .map(|&v| v + 0.0)
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();
    indexed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ranks = vec![0usize; n];
    for (rank_minus_1, &(_, orig_idx)) in indexed.iter().enumerate() {
        ranks[orig_idx] = rank_minus_1 + 1;
    }
    ranks
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_no_ties() {
        assert_eq!(ordinal_rank(&[3.0, 1.0, 2.0]), vec![3, 1, 2]);
    }

    #[test]
    fn ordinal_ties_follow_encounter_order() {
        let data = [3.0, 1.0, 2.0, 2.0];
        assert_eq!(ordinal_rank(&data), vec![4, 1, 2, 3]);
    }

    #[test]
    fn ordinal_all_equal() {
        assert_eq!(ordinal_rank(&[5.0, 5.0, 5.0]), vec![1, 2, 3]);
    }

    #[test]
    fn ordinal_signed_zeros_tie() {
        // -0.0 comes second, so it must rank after +0.0.
        assert_eq!(ordinal_rank(&[0.0, -0.0]), vec![1, 2]);
        assert_eq!(ordinal_rank(&[-0.0, 0.0]), vec![1, 2]);
    }

    #[test]
    fn ordinal_infinities() {
        let data = [f64::INFINITY, 0.0, f64::NEG_INFINITY];
        assert_eq!(ordinal_rank(&data), vec![3, 2, 1]);
    }

    #[test]
    fn ordinal_empty() {
        assert!(ordinal_rank(&[]).is_empty());
    }
}
