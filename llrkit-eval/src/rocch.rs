//! ROC convex hull (ROCCH) and the optimal Bayes error-rate.
//!
//! The hull is read directly off a [`Pav`] fit: cumulating block target
//! counts gives the miss rates and cumulating non-target counts gives the
//! false-alarm rates. Convexity is inherited from the PAV solution and is
//! not recomputed.
//!
//! Vertices are stored as parallel `(Pmiss, Pfa)` arrays running from
//! `(0, 1)` to `(1, 0)`, with Pmiss non-decreasing and Pfa non-increasing.

use llrkit_core::{sigmoid, LlrError, Result};

use crate::eer::{eer_search, EerConfig};
use crate::pav::Pav;

/// The ROC convex hull as `n_blocks + 1` vertices in the (Pmiss, Pfa) plane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RocchVertices"))]
pub struct Rocch {
    pmiss: Vec<f64>,
    pfa: Vec<f64>,
}

/// Unchecked wire form of [`Rocch`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RocchVertices {
    pmiss: Vec<f64>,
    pfa: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RocchVertices> for Rocch {
    type Error = LlrError;

    fn try_from(v: RocchVertices) -> Result<Self> {
        Rocch::from_vertices(v.pmiss, v.pfa)
    }
}

/// Optimal Bayes error at one operating point together with the hull
/// vertex that attains it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BayesErrorPoint {
    /// `min_k ptar · Pmiss_k + pnon · Pfa_k`.
    pub ber: f64,
    /// Miss rate at the minimizing vertex.
    pub pmiss: f64,
    /// False-alarm rate at the minimizing vertex.
    pub pfa: f64,
}

impl Rocch {
    /// Build the hull from a fitted PAV model.
    pub fn from_pav(pav: &Pav) -> Self {
        let t = pav.n_targets();
        let n = pav.n_nontargets();
        let nv = pav.n_blocks() + 1;

        let mut pmiss = Vec::with_capacity(nv);
        let mut pfa = Vec::with_capacity(nv);
        pmiss.push(0.0);
        pfa.push(1.0);

        let mut cum_tar = 0usize;
        let mut cum_non = 0usize;
        for block in pav.blocks() {
            cum_tar += block.targets;
            cum_non += block.nontargets;
            pmiss.push(cum_tar as f64 / t as f64);
            pfa.push((n - cum_non) as f64 / n as f64);
        }

        Self { pmiss, pfa }
    }

    /// Rebuild a hull from stored vertex coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`LlrError::InvalidInput`] unless the arrays have equal
    /// length of at least 2, run from `(0, 1)` to `(1, 0)`, hold no NaN, and
    /// have Pmiss non-decreasing and Pfa non-increasing.
    pub fn from_vertices(pmiss: Vec<f64>, pfa: Vec<f64>) -> Result<Self> {
        if pmiss.len() != pfa.len() || pmiss.len() < 2 {
            return Err(LlrError::InvalidInput(format!(
                "hull needs two equal-length coordinate arrays of at least 2 vertices, got {} and {}",
                pmiss.len(),
                pfa.len()
            )));
        }
        let last = pmiss.len() - 1;
        if pmiss[0] != 0.0 || pfa[0] != 1.0 || pmiss[last] != 1.0 || pfa[last] != 0.0 {
            return Err(LlrError::InvalidInput(
                "hull must run from (0, 1) to (1, 0)".into(),
            ));
        }
        if let Some(k) = (1..pmiss.len())
            .find(|&k| !(pmiss[k] >= pmiss[k - 1]) || !(pfa[k] <= pfa[k - 1]))
        {
            return Err(LlrError::InvalidInput(format!(
                "hull vertex {} breaks monotonicity",
                k
            )));
        }
        Ok(Self { pmiss, pfa })
    }

    /// Miss-rate coordinates of the vertices (non-decreasing, `0 → 1`).
    pub fn pmiss(&self) -> &[f64] {
        &self.pmiss
    }

    /// False-alarm coordinates of the vertices (non-increasing, `1 → 0`).
    pub fn pfa(&self) -> &[f64] {
        &self.pfa
    }

    /// Both coordinate arrays.
    pub fn pmiss_pfa(&self) -> (&[f64], &[f64]) {
        (&self.pmiss, &self.pfa)
    }

    /// Number of hull vertices (always at least 2).
    pub fn n_vertices(&self) -> usize {
        self.pmiss.len()
    }

    /// Area under the hull, with Pfa on the horizontal axis.
    ///
    /// This is an error-rate reading: 0 for perfectly separated classes,
    /// 0.5 when targets and non-targets are indistinguishable.
    pub fn auc(&self) -> f64 {
        self.pmiss
            .windows(2)
            .zip(self.pfa.windows(2))
            .map(|(y, x)| (x[0] - x[1]) * (y[0] + y[1]) / 2.0)
            .sum()
    }

    /// Index of the vertex minimizing `ptar · Pmiss + pnon · Pfa` and the
    /// minimum itself. NaN operating points give a NaN cost.
    fn min_cost(&self, plo: f64) -> (usize, f64) {
        let ptar = sigmoid(plo);
        let pnon = sigmoid(-plo);
        let mut best = 0;
        let mut best_cost = ptar * self.pmiss[0] + pnon * self.pfa[0];
        for k in 1..self.pmiss.len() {
            let cost = ptar * self.pmiss[k] + pnon * self.pfa[k];
            if cost < best_cost {
                best = k;
                best_cost = cost;
            }
        }
        (best, best_cost)
    }

    /// Optimal Bayes error-rate at prior log-odds `plo`.
    ///
    /// `BER(plo) = min_k sigmoid(plo) · Pmiss_k + sigmoid(-plo) · Pfa_k`:
    /// the lowest error reachable at this prior after optimal monotonic
    /// recalibration of the scores.
    pub fn bayes_error_rate(&self, plo: f64) -> f64 {
        self.min_cost(plo).1
    }

    /// Optimal Bayes error-rate at each operating point, in input order.
    pub fn bayes_error_rates(&self, plo: &[f64]) -> Vec<f64> {
        plo.iter().map(|&x| self.bayes_error_rate(x)).collect()
    }

    /// Optimal Bayes error-rate plus the (Pmiss, Pfa) vertex achieving it.
    pub fn bayes_error_rate_with_point(&self, plo: f64) -> BayesErrorPoint {
        let (k, ber) = self.min_cost(plo);
        BayesErrorPoint {
            ber,
            pmiss: self.pmiss[k],
            pfa: self.pfa[k],
        }
    }

    /// [`Rocch::bayes_error_rate_with_point`] at each operating point.
    pub fn bayes_error_rates_with_points(&self, plo: &[f64]) -> Vec<BayesErrorPoint> {
        plo.iter()
            .map(|&x| self.bayes_error_rate_with_point(x))
            .collect()
    }

    /// Equal error-rate: the maximum of the optimal Bayes error-rate over
    /// all operating points, found by golden-section search with the
    /// default [`EerConfig`].
    pub fn eer(&self) -> f64 {
        eer_search(self, &EerConfig::default()).eer
    }

    /// Equal error-rate computed geometrically, as the point where the hull
    /// crosses the line `Pmiss = Pfa`.
    pub fn equal_error_point(&self) -> f64 {
        for (y, x) in self.pmiss.windows(2).zip(self.pfa.windows(2)) {
            let d0 = y[0] - x[0];
            let d1 = y[1] - x[1];
            if d0 < 0.0 && d1 >= 0.0 {
                let t = -d0 / (d1 - d0);
                return y[0] + t * (y[1] - y[0]);
            }
        }
        // Unreachable for a valid hull: d starts at -1 and ends at +1.
        0.5
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn rocch(tar: &[f64], non: &[f64]) -> Rocch {
        Pav::from_tarnon(tar, non).unwrap().rocch()
    }

    #[test]
    fn separable_vertices() {
        let r = rocch(&[1.0, 1.0, 1.0], &[-1.0, -1.0, -1.0]);
        assert_eq!(r.pmiss(), &[0.0, 0.0, 1.0]);
        assert_eq!(r.pfa(), &[1.0, 0.0, 0.0]);
        assert_eq!(r.auc(), 0.0);
        assert_eq!(r.equal_error_point(), 0.0);
    }

    #[test]
    fn tied_two_vertices() {
        let r = rocch(&[0.0; 4], &[0.0; 4]);
        assert_eq!(r.n_vertices(), 2);
        assert_eq!(r.pmiss_pfa(), (&[0.0, 1.0][..], &[1.0, 0.0][..]));
        assert!((r.auc() - 0.5).abs() < TOL);
        assert!((r.equal_error_point() - 0.5).abs() < TOL);
    }

    #[test]
    fn minimal_pair_vertex_counts() {
        let ordered = rocch(&[1.0], &[0.0]);
        assert_eq!(ordered.n_vertices(), 3);
        let reversed = rocch(&[0.0], &[1.0]);
        assert_eq!(reversed.n_vertices(), 2);
        for r in [ordered, reversed] {
            assert_eq!((r.pmiss()[0], r.pfa()[0]), (0.0, 1.0));
            let last = r.n_vertices() - 1;
            assert_eq!((r.pmiss()[last], r.pfa()[last]), (1.0, 0.0));
        }
    }

    #[test]
    fn vertices_from_block_counts() {
        // Blocks: (t=0, n=1), (t=1, n=1), (t=2, n=0); T = 3, N = 2.
        let r = rocch(&[1.0, 2.0, 3.0], &[0.0, 1.0]);
        let expected_pmiss = [0.0, 0.0, 1.0 / 3.0, 1.0];
        let expected_pfa = [1.0, 0.5, 0.0, 0.0];
        for k in 0..4 {
            assert!((r.pmiss()[k] - expected_pmiss[k]).abs() < TOL);
            assert!((r.pfa()[k] - expected_pfa[k]).abs() < TOL);
        }
        // Area: segment 0→1 contributes 0.5 · 0, segment 1→2 contributes
        // 0.5 · (1/6).
        assert!((r.auc() - 1.0 / 12.0).abs() < TOL);
    }

    #[test]
    fn bayes_error_rate_at_even_prior() {
        let r = rocch(&[1.0, 2.0, 3.0], &[0.0, 1.0]);
        // Costs at ptar = 0.5: 0.5, 0.25, 1/6, 0.5.
        assert!((r.bayes_error_rate(0.0) - 1.0 / 6.0).abs() < TOL);
        let pt = r.bayes_error_rate_with_point(0.0);
        assert!((pt.pmiss - 1.0 / 3.0).abs() < TOL);
        assert_eq!(pt.pfa, 0.0);
    }

    #[test]
    fn bayes_error_rate_bounded_by_default() {
        let r = rocch(&[0.5, 1.0, -0.2, 2.0], &[0.0, -1.0, 0.7, -0.3]);
        for i in -40..=40 {
            let plo = i as f64 * 0.25;
            let ber = r.bayes_error_rate(plo);
            let der = sigmoid(plo).min(sigmoid(-plo));
            assert!(ber >= 0.0);
            assert!(ber <= der + TOL);
        }
    }

    #[test]
    fn bayes_error_rate_extreme_priors() {
        let r = rocch(&[0.5, 1.0], &[0.0, 0.7]);
        assert_eq!(r.bayes_error_rate(f64::INFINITY), 0.0);
        assert_eq!(r.bayes_error_rate(f64::NEG_INFINITY), 0.0);
        assert!(r.bayes_error_rate(f64::NAN).is_nan());
    }

    #[test]
    fn vector_preserves_order() {
        let r = rocch(&[0.5, 1.0, -0.2], &[0.0, -1.0, 0.7]);
        let plo = [2.0, -1.0, 0.0, 2.0];
        let v = r.bayes_error_rates(&plo);
        assert_eq!(v.len(), 4);
        for (x, y) in plo.iter().zip(&v) {
            assert_eq!(r.bayes_error_rate(*x), *y);
        }
        assert_eq!(v[0], v[3]);
        assert!(r.bayes_error_rates(&[]).is_empty());
        let pts = r.bayes_error_rates_with_points(&plo);
        assert_eq!(pts[1].ber, v[1]);
    }

    #[test]
    fn eer_matches_geometric_crossing() {
        let r = rocch(&[1.0, 2.0, 3.0], &[0.0, 1.0]);
        // Crossing on the segment (0, .5) → (1/3, 0): Pmiss = Pfa = 0.2.
        assert!((r.equal_error_point() - 0.2).abs() < TOL);
        assert!((r.eer() - 0.2).abs() < 1e-8);
    }

    #[test]
    fn from_vertices_round_trips_a_fitted_hull() {
        let r = rocch(&[1.0, 2.0, 3.0], &[0.0, 1.0]);
        let rebuilt = Rocch::from_vertices(r.pmiss().to_vec(), r.pfa().to_vec()).unwrap();
        assert_eq!(rebuilt, r);
        assert_eq!(rebuilt.auc(), r.auc());
    }

    #[test]
    fn from_vertices_rejects_broken_hulls() {
        let bad = [
            (vec![], vec![]),
            (vec![0.0], vec![1.0]),
            (vec![0.0, 1.0], vec![1.0]),
            (vec![0.5, 1.0], vec![1.0, 0.0]),
            (vec![0.0, 0.9], vec![1.0, 0.0]),
            (vec![0.0, 0.6, 0.4, 1.0], vec![1.0, 0.5, 0.3, 0.0]),
            (vec![0.0, 0.5, 0.7, 1.0], vec![1.0, 0.2, 0.4, 0.0]),
            (vec![0.0, f64::NAN, 1.0], vec![1.0, 0.5, 0.0]),
        ];
        for (pmiss, pfa) in bad {
            assert!(matches!(
                Rocch::from_vertices(pmiss, pfa),
                Err(LlrError::InvalidInput(_))
            ));
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_tarnon() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        (
            proptest::collection::vec(-20i32..20, 1..40),
            proptest::collection::vec(-20i32..20, 1..40),
        )
            .prop_map(|(t, n)| {
                (
                    t.into_iter().map(|x| x as f64 * 0.25 + 1.0).collect(),
                    n.into_iter().map(|x| x as f64 * 0.25).collect(),
                )
            })
    }

    proptest! {
        #[test]
        fn hull_shape((tar, non) in arb_tarnon()) {
            let pav = Pav::from_tarnon(&tar, &non).unwrap();
            let r = pav.rocch();
            let last = r.n_vertices() - 1;
            prop_assert_eq!(r.n_vertices(), pav.n_blocks() + 1);
            prop_assert!(r.n_vertices() >= 2);
            prop_assert_eq!(r.pmiss()[0], 0.0);
            prop_assert_eq!(r.pfa()[0], 1.0);
            prop_assert_eq!(r.pmiss()[last], 1.0);
            prop_assert_eq!(r.pfa()[last], 0.0);
            for k in 0..last {
                prop_assert!(r.pmiss()[k] <= r.pmiss()[k + 1]);
                prop_assert!(r.pfa()[k] >= r.pfa()[k + 1]);
            }
        }

        #[test]
        fn auc_in_unit_interval((tar, non) in arb_tarnon()) {
            let auc = rocch_of(&tar, &non).auc();
            prop_assert!((0.0..=1.0).contains(&auc));
        }

        #[test]
        fn eer_bounded_and_on_crossing((tar, non) in arb_tarnon()) {
            let r = rocch_of(&tar, &non);
            let eer = r.eer();
            prop_assert!((0.0..=0.5).contains(&eer));
            prop_assert!((eer - r.equal_error_point()).abs() < 1e-8);
        }

        #[test]
        fn repeated_evaluation_is_bit_identical((tar, non) in arb_tarnon(), plo in -10.0f64..10.0) {
            let r = rocch_of(&tar, &non);
            prop_assert_eq!(r.bayes_error_rate(plo).to_bits(), r.bayes_error_rate(plo).to_bits());
        }
    }

    fn rocch_of(tar: &[f64], non: &[f64]) -> Rocch {
        Pav::from_tarnon(tar, non).unwrap().rocch()
    }
}
