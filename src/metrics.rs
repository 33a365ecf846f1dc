//! Internal cluster-quality scores: mean silhouette coefficient and Calinski-Harabasz index.
//!
//! Noise rows are dropped before scoring. Both scores need at least two clusters and fewer
//! clusters than scored rows, otherwise they are `None`.

use crate::clustering::utils::{compute_mean, member_indices};
use crate::clustering::{ClusterId, NOISE};
use crate::distances::{DistanceMetric, EuclideanDistance, SquaredEuclideanDistance};
use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;
use serde::Serialize;

/// Quality of one partition of the training matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct QualityScores {
    /// Mean silhouette coefficient, in [-1, 1].
    pub silhouette: Option<f64>,
    /// Between-cluster over within-cluster dispersion, scaled by degrees of freedom.
    pub calinski_harabasz: Option<f64>,
    /// Rows that took part in scoring.
    pub n_scored: usize,
}

/// Non-noise rows with their labels renumbered `0..n_clusters`.
struct ScoredRows {
    rows: Vec<usize>,
    labels: Vec<usize>,
    n_clusters: usize,
}

impl ScoredRows {
    fn new(labels: &[ClusterId]) -> Self {
        let mut ids: Vec<ClusterId> = labels.iter().copied().filter(|&l| l != NOISE).collect();
        ids.sort_unstable();
        ids.dedup();

        let (rows, dense): (Vec<usize>, Vec<usize>) = labels
            .iter()
            .enumerate()
            .filter_map(|(row, label)| ids.binary_search(label).ok().map(|c| (row, c)))
            .unzip();
        Self {
            rows,
            labels: dense,
            n_clusters: ids.len(),
        }
    }

    fn is_scorable(&self) -> bool {
        self.n_clusters >= 2 && self.n_clusters < self.rows.len()
    }

    fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &c in &self.labels {
            sizes[c] += 1;
        }
        sizes
    }
}

/// Both scores for `labels` over the rows of `x`.
pub fn score(x: &ArrayView2<f64>, labels: &[ClusterId]) -> QualityScores {
    let scored = ScoredRows::new(labels);
    if !scored.is_scorable() {
        return QualityScores {
            n_scored: scored.rows.len(),
            ..QualityScores::default()
        };
    }
    QualityScores {
        silhouette: Some(silhouette(x, &scored)),
        calinski_harabasz: Some(calinski_harabasz(x, &scored)),
        n_scored: scored.rows.len(),
    }
}

pub fn silhouette_score(x: &ArrayView2<f64>, labels: &[ClusterId]) -> Option<f64> {
    let scored = ScoredRows::new(labels);
    scored.is_scorable().then(|| silhouette(x, &scored))
}

pub fn calinski_harabasz_score(x: &ArrayView2<f64>, labels: &[ClusterId]) -> Option<f64> {
    let scored = ScoredRows::new(labels);
    scored.is_scorable().then(|| calinski_harabasz(x, &scored))
}

/// Score with `decimals` places, or `n/a` when the partition cannot be scored.
pub fn format_score(score: Option<f64>, decimals: usize) -> String {
    score.map_or_else(|| "n/a".to_string(), |value| format!("{:.*}", decimals, value))
}

/// Rows in singleton clusters score 0.
fn silhouette(x: &ArrayView2<f64>, scored: &ScoredRows) -> f64 {
    let k = scored.n_clusters;
    let sizes = scored.cluster_sizes();

    let total: f64 = scored
        .rows
        .par_iter()
        .zip(scored.labels.par_iter())
        .map(|(&i, &own)| {
            if sizes[own] < 2 {
                return 0.0;
            }
            let row = x.row(i);
            let mut sums = vec![0.0; k];
            for (&j, &c) in scored.rows.iter().zip(&scored.labels) {
                sums[c] += EuclideanDistance.compute(&row, &x.row(j));
            }
            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..k)
                .filter(|&c| c != own)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);
            let denominator = a.max(b);
            if denominator > 0.0 {
                (b - a) / denominator
            } else {
                0.0
            }
        })
        .sum();

    total / scored.rows.len() as f64
}

/// A partition with zero within-cluster dispersion scores 1.
fn calinski_harabasz(x: &ArrayView2<f64>, scored: &ScoredRows) -> f64 {
    let n = scored.rows.len();
    let k = scored.n_clusters;
    let kept = x.select(Axis(0), &scored.rows);
    let kept = kept.view();
    let all: Vec<usize> = (0..n).collect();
    let global = compute_mean(&kept, &all);

    let mut between = 0.0;
    let mut within = 0.0;
    for c in 0..k {
        let members = member_indices(&scored.labels, c);
        let centroid = compute_mean(&kept, &members);
        between += members.len() as f64 * SquaredEuclideanDistance.compute(&centroid.view(), &global.view());
        within += members
            .iter()
            .map(|&i| SquaredEuclideanDistance.compute(&kept.row(i), &centroid.view()))
            .sum::<f64>();
    }

    if within == 0.0 {
        1.0
    } else {
        between * (n - k) as f64 / (within * (k - 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_two_well_separated_pairs() {
        let x = array![[0.0], [1.0], [10.0], [11.0]];
        let labels = [0, 0, 1, 1];

        // Rows 0 and 3: a = 1, b = 10.5. Rows 1 and 2: a = 1, b = 9.5.
        let expected = (9.5 / 10.5 + 8.5 / 9.5) / 2.0;
        let silhouette = silhouette_score(&x.view(), &labels).unwrap();
        assert!((silhouette - expected).abs() < 1e-12, "got {}", silhouette);

        // Between = 2 * 25 + 2 * 25, within = 4 * 0.25, (n - k) / (k - 1) = 2.
        let ch = calinski_harabasz_score(&x.view(), &labels).unwrap();
        assert!((ch - 200.0).abs() < 1e-9, "got {}", ch);
    }

    #[test]
    fn test_noise_rows_are_ignored() {
        let x = array![[0.0], [1.0], [100.0], [10.0], [11.0]];
        let labels = [0, 0, NOISE, 1, 1];

        let scores = score(&x.view(), &labels);
        assert_eq!(scores.n_scored, 4);
        let clean = score(&array![[0.0], [1.0], [10.0], [11.0]].view(), &[0, 0, 1, 1]);
        assert!((scores.silhouette.unwrap() - clean.silhouette.unwrap()).abs() < 1e-12);
        assert!((scores.calinski_harabasz.unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_singleton_cluster_scores_zero() {
        let x = array![[0.0], [1.0], [10.0]];
        let labels = [0, 0, 1];

        // Row 0: (10 - 1) / 10, row 1: (9 - 1) / 9, row 2 is a singleton.
        let expected = (0.9 + 8.0 / 9.0 + 0.0) / 3.0;
        let silhouette = silhouette_score(&x.view(), &labels).unwrap();
        assert!((silhouette - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_within_dispersion() {
        let x = array![[0.0, 0.0], [0.0, 0.0], [3.0, 4.0], [3.0, 4.0]];
        let labels = [0, 0, 1, 1];
        assert_eq!(calinski_harabasz_score(&x.view(), &labels), Some(1.0));
        assert_eq!(silhouette_score(&x.view(), &labels), Some(1.0));
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(0.55555), 3), "0.556");
        assert_eq!(format_score(Some(200.0), 1), "200.0");
        assert_eq!(format_score(None, 1), "n/a");
    }

    #[test]
    fn test_unscorable_partitions() {
        let x = array![[0.0], [1.0], [2.0]];

        assert_eq!(score(&x.view(), &[0, 0, 0]), QualityScores { n_scored: 3, ..Default::default() });
        assert_eq!(silhouette_score(&x.view(), &[0, 1, 2]), None);
        assert_eq!(calinski_harabasz_score(&x.view(), &[NOISE, NOISE, NOISE]), None);
        assert_eq!(silhouette_score(&x.view(), &[0, 1, NOISE]), None);
    }
}
