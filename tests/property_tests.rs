use custseg::clustering::{linkage, LinkageMethod, NOISE};
use custseg::profiler::list_clusters;
use custseg::resolver::AssignmentResolver;
use custseg::Strategy;
use ndarray::Array2;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn matrix(rows: &[Vec<f64>]) -> Array2<f64> {
    let cols = rows.first().map_or(0, |r| r.len());
    Array2::from_shape_fn((rows.len(), cols), |(i, j)| rows[i][j])
}

proptest! {
    #[test]
    fn prop_training_row_borrows_first_identical_label(
        rows in prop::collection::vec(prop::collection::vec(-5.0f64..5.0, 3), 1..30),
        raw_labels in prop::collection::vec(-1i32..4, 30),
        pick in 0usize..30,
    ) {
        let x = matrix(&rows);
        let labels = &raw_labels[..x.nrows()];
        let i = pick % x.nrows();

        let assignment = AssignmentResolver::new()
            .assign(&x.row(i), Strategy::Density, &x.view(), labels)
            .unwrap();

        // Duplicated rows resolve to the first copy.
        let first = (0..x.nrows()).find(|&j| x.row(j) == x.row(i)).unwrap();
        prop_assert_eq!(assignment.nearest_index, first);
        prop_assert_eq!(assignment.cluster_id, labels[first]);
        prop_assert_eq!(assignment.distance, 0.0);
    }

    #[test]
    fn prop_listing_conserves_mass(
        rows in prop::collection::vec(prop::collection::vec(-5.0f64..5.0, 4), 1..40),
        raw_labels in prop::collection::vec(-1i32..6, 40),
    ) {
        let x = matrix(&rows);
        let labels = &raw_labels[..x.nrows()];

        let listing = list_clusters(Strategy::Density, &x.view(), labels);
        let listed: usize = listing.values().map(|p| p.size).sum();
        let noise = labels.iter().filter(|&&l| l == NOISE).count();

        prop_assert_eq!(listed + noise, labels.len());
        prop_assert!(!listing.contains_key(&NOISE));
        for profile in listing.values() {
            prop_assert!(profile.population_fraction >= 0.0 && profile.population_fraction <= 1.0);
        }
    }

    #[test]
    fn prop_tree_cuts_respect_cluster_count(
        rows in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 2), 2..25),
        k in 1usize..6,
        ward in any::<bool>(),
    ) {
        let x = matrix(&rows);
        let method = if ward { LinkageMethod::Ward } else { LinkageMethod::Complete };
        let tree = linkage(&x.view(), method).unwrap();
        prop_assert_eq!(tree.merges().len(), x.nrows() - 1);

        let mut leaves = tree.leaves_list();
        leaves.sort_unstable();
        prop_assert_eq!(leaves, (0..x.nrows()).collect::<Vec<_>>());

        let maxclust: BTreeSet<usize> = tree.fcluster_maxclust(k).unwrap().into_iter().collect();
        prop_assert!(maxclust.len() <= k.max(1));
        prop_assert_eq!(maxclust.iter().next().copied(), Some(1));

        if k <= x.nrows() {
            let cut: BTreeSet<usize> = tree.cut_tree(k).unwrap().into_iter().collect();
            prop_assert_eq!(cut, (0..k).collect::<BTreeSet<_>>());
        }
    }
}
