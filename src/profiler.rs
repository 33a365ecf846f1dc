//! Per-cluster statistics and whole-matrix summaries.

use crate::clustering::utils::{compute_mean, member_indices};
use crate::clustering::{ClusterId, NOISE};
use crate::encoder::Feature;
use crate::model_bank::Strategy;
use ndarray::{ArrayView2, Axis};
use serde::Serialize;
use std::collections::BTreeMap;

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Summary of one cluster under one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterProfile {
    pub cluster_id: ClusterId,
    pub strategy: &'static str,
    pub size: usize,
    /// Share of the training set in percent, two decimals.
    pub percentage: f64,
    /// `percentage / 100`, four decimals.
    pub population_fraction: f64,
    /// Column name to member mean, four decimals.
    pub features: BTreeMap<&'static str, f64>,
}

/// Profile of `cluster_id`, or `None` when no training row carries that label.
pub fn profile(
    cluster_id: ClusterId,
    strategy: Strategy,
    x: &ArrayView2<f64>,
    labels: &[ClusterId],
) -> Option<ClusterProfile> {
    let members = member_indices(labels, cluster_id);
    if members.is_empty() {
        return None;
    }

    let size = members.len();
    let percentage = round_to(size as f64 / labels.len() as f64 * 100.0, 2);
    let means = compute_mean(x, &members);
    let features = Feature::ALL
        .iter()
        .map(|feature| (feature.column_name(), round_to(means[feature.index()], 4)))
        .collect();

    Some(ClusterProfile {
        cluster_id,
        strategy: strategy.name(),
        size,
        percentage,
        population_fraction: round_to(percentage / 100.0, 4),
        features,
    })
}

/// Profiles of every cluster present in `labels`, ascending by id, noise excluded.
pub fn list_clusters(
    strategy: Strategy,
    x: &ArrayView2<f64>,
    labels: &[ClusterId],
) -> BTreeMap<ClusterId, ClusterProfile> {
    let mut ids: Vec<ClusterId> = labels.iter().copied().filter(|&l| l != NOISE).collect();
    ids.sort_unstable();
    ids.dedup();

    ids.into_iter()
        .filter_map(|id| profile(id, strategy, x, labels).map(|p| (id, p)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (N - 1 denominator); 0 for a single row.
    pub std: f64,
}

/// Column statistics of the encoded matrix, keyed by column name.
pub fn data_summary(x: &ArrayView2<f64>) -> BTreeMap<&'static str, FeatureSummary> {
    let n = x.nrows();
    Feature::ALL
        .iter()
        .filter(|feature| feature.index() < x.ncols())
        .map(|feature| {
            let column = x.index_axis(Axis(1), feature.index());
            let summary = FeatureSummary {
                min: column.iter().copied().fold(f64::INFINITY, f64::min),
                max: column.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                mean: column.mean().unwrap_or(0.0),
                std: if n > 1 { column.std(1.0) } else { 0.0 },
            };
            (feature.column_name(), summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fixture() -> (ndarray::Array2<f64>, Vec<ClusterId>) {
        let x = array![
            [1.0, 2.0, 3.0, 1.0],
            [3.0, 4.0, 5.0, 0.0],
            [10.0, 10.0, 10.0, 1.0],
        ];
        (x, vec![0, 0, NOISE])
    }

    #[test]
    fn test_profile() {
        let (x, labels) = fixture();
        let p = profile(0, Strategy::Density, &x.view(), &labels).unwrap();

        assert_eq!(p.size, 2);
        assert_eq!(p.percentage, 66.67);
        assert_eq!(p.population_fraction, 0.6667);
        assert_eq!(serde_json::to_value(&p).unwrap()["population_fraction"].to_string(), "0.6667");
        assert_eq!(p.features["Age"], 2.0);
        assert_eq!(p.features["Genre_Male"], 0.5);
        assert_eq!(p.strategy, "dbscan");
    }

    #[test]
    fn test_profile_of_absent_cluster_is_none() {
        let (x, labels) = fixture();
        assert!(profile(4, Strategy::Density, &x.view(), &labels).is_none());
    }

    #[test]
    fn test_listing_skips_noise() {
        let (x, labels) = fixture();
        let listing = list_clusters(Strategy::Density, &x.view(), &labels);
        assert_eq!(listing.keys().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_data_summary() {
        let (x, _) = fixture();
        let summary = data_summary(&x.view());
        let age = summary["Age"];
        assert_eq!(age.min, 1.0);
        assert_eq!(age.max, 10.0);
        assert!((age.mean - 14.0 / 3.0).abs() < 1e-12);
        // Sample variance of {1, 3, 10} is 201 / 9.
        assert!((age.std - (201.0_f64 / 9.0).sqrt()).abs() < 1e-12);
        assert_eq!(summary.len(), 4);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(33.333333, 2), 33.33);
    }
}
