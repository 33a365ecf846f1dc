mod common;

use common::synthetic_records;
use custseg::clustering::NOISE;
use custseg::config::Config;
use custseg::encoder::Feature;
use custseg::metrics::silhouette_score;
use custseg::profiler::{data_summary, list_clusters};
use custseg::resolver::AssignmentResolver;
use custseg::{SegmentationContext, SegmentationContextBuilder, Strategy};
use std::collections::BTreeSet;

fn context() -> SegmentationContext {
    SegmentationContextBuilder::new(&Config::default())
        .with_records(synthetic_records(200, 42))
        .build()
        .unwrap()
}

#[test]
fn test_label_vectors_cover_every_row() {
    let context = context();
    let x = context.x();

    for strategy in Strategy::ALL {
        let labels = context.bank().labels(strategy);
        assert_eq!(labels.len(), x.nrows());

        let distinct: BTreeSet<i32> = labels.iter().copied().filter(|&l| l != NOISE).collect();
        let listed: BTreeSet<i32> = list_clusters(strategy, &x, labels).keys().copied().collect();
        assert_eq!(distinct, listed, "{} listing disagrees with labels", strategy);

        if strategy != Strategy::Density {
            assert!(!labels.contains(&NOISE));
        }
    }
}

#[test]
fn test_hierarchical_strategies_have_five_clusters() {
    let context = context();
    assert_eq!(
        context.bank().cluster_ids(Strategy::Agglomerative),
        vec![0, 1, 2, 3, 4]
    );
    // The maxclust cut may yield fewer groups on ties, never more.
    let divisive = context.bank().cluster_ids(Strategy::Divisive);
    assert!(!divisive.is_empty() && divisive.len() <= 5);
    assert_eq!(divisive[0], 0);
}

#[test]
fn test_profile_invariants() {
    let context = context();
    let x = context.x();
    let n = x.nrows();
    let summary = data_summary(&x);

    for strategy in Strategy::ALL {
        let labels = context.bank().labels(strategy);
        let listing = list_clusters(strategy, &x, labels);

        let total: usize = listing.values().map(|p| p.size).sum();
        let noise = labels.iter().filter(|&&l| l == NOISE).count();
        assert_eq!(total + noise, n);

        for profile in listing.values() {
            assert!((0.0..=1.0).contains(&profile.population_fraction));
            for feature in Feature::ALL {
                let name = feature.column_name();
                let mean = profile.features[name];
                let range = summary[name];
                assert!(
                    mean >= range.min - 1e-4 && mean <= range.max + 1e-4,
                    "{} mean {} outside [{}, {}]",
                    name,
                    mean,
                    range.min,
                    range.max
                );
            }
        }
    }
}

#[test]
fn test_assigning_a_training_row_returns_its_label() {
    let context = context();
    let x = context.x();
    let resolver = AssignmentResolver::new();

    for strategy in Strategy::ALL {
        let labels = context.bank().labels(strategy);
        for i in (0..x.nrows()).step_by(17) {
            let first = resolver.assign(&x.row(i), strategy, &x, labels).unwrap();
            let second = resolver.assign(&x.row(i), strategy, &x, labels).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.distance, 0.0);
            assert_eq!(first.cluster_id, labels[first.nearest_index]);
            assert_eq!(x.row(first.nearest_index), x.row(i));
        }
    }
}

#[test]
fn test_quality_scores_match_the_published_labels() {
    let context = context();
    let x = context.x();

    for strategy in Strategy::ALL {
        let labels = context.bank().labels(strategy);
        let quality = context.bank().quality(strategy);
        let noise = labels.iter().filter(|&&l| l == NOISE).count();

        assert_eq!(quality.n_scored, labels.len() - noise);
        assert_eq!(quality.silhouette.is_some(), quality.calinski_harabasz.is_some());
        if let Some(silhouette) = quality.silhouette {
            let recomputed = silhouette_score(&x, labels).unwrap();
            assert!((silhouette - recomputed).abs() < 1e-9);
            assert!((-1.0..=1.0).contains(&silhouette));
        }
    }

    // Ward over five separated blobs should find a clearly structured partition.
    let ward = context.bank().quality(Strategy::Agglomerative);
    assert!(ward.silhouette.unwrap() > 0.3);
    assert!(ward.calinski_harabasz.unwrap() > 1.0);
}
