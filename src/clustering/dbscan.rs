//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! - **Epsilon (ε)**: maximum Euclidean distance for two rows to be neighbours.
//! - **MinPts**: minimum neighbourhood size, the row itself included, for a row to be *core*.
//! - **Border row**: within ε of a core row but not core itself.
//! - **Noise row**: neither core nor border; labelled [`NOISE`].
//!
//! Rows are visited in training order. Each unlabelled core row opens a new cluster, grown
//! with a LIFO stack. A border row reachable from two clusters keeps the label of the
//! cluster that reached it first, so labels depend on row order.

use super::{ClusterId, NOISE};
use crate::core::float::SegmentFloat;
use crate::distances::{DistanceMetric, EuclideanDistance};
use crate::error::ClusterError;
use log::debug;
use ndarray::ArrayView2;
use rayon::prelude::*;

/// DBSCAN clustering over the rows of a dense matrix.
#[derive(Debug, Clone)]
pub struct Dbscan<F: SegmentFloat> {
    epsilon: F,
    min_pts: usize,
}

impl<F: SegmentFloat> Dbscan<F> {
    /// Create a new DBSCAN clusterer.
    pub fn new(epsilon: F, min_pts: usize) -> Self {
        Self { epsilon, min_pts }
    }

    fn validate(&self, n_rows: usize) -> Result<(), ClusterError> {
        if n_rows == 0 {
            return Err(ClusterError::EmptyInput);
        }
        // Also rejects NaN.
        if !(self.epsilon > F::zero()) {
            return Err(ClusterError::InvalidParameter {
                name: "epsilon",
                message: "must be positive",
            });
        }
        if self.min_pts == 0 {
            return Err(ClusterError::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Neighbourhood of every row, in ascending row order, including the row itself.
    fn neighborhoods(&self, data: &ArrayView2<F>) -> Vec<Vec<usize>> {
        let n = data.nrows();
        (0..n)
            .into_par_iter()
            .map(|i| {
                let point = data.row(i);
                (0..n)
                    .filter(|&j| EuclideanDistance.compute(&point, &data.row(j)) <= self.epsilon)
                    .collect()
            })
            .collect()
    }

    /// Label every row with a cluster id (0, 1, ...) or [`NOISE`].
    pub fn fit_predict(&self, data: &ArrayView2<F>) -> Result<Vec<ClusterId>, ClusterError> {
        let n = data.nrows();
        self.validate(n)?;

        let neighborhoods = self.neighborhoods(data);
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|neighbors| neighbors.len() >= self.min_pts)
            .collect();

        let mut labels = vec![NOISE; n];
        let mut next_label: ClusterId = 0;
        let mut stack: Vec<usize> = Vec::new();

        for seed in 0..n {
            if labels[seed] != NOISE || !is_core[seed] {
                continue;
            }

            let mut current = seed;
            loop {
                if labels[current] == NOISE {
                    labels[current] = next_label;
                    if is_core[current] {
                        stack.extend(
                            neighborhoods[current]
                                .iter()
                                .copied()
                                .filter(|&neighbor| labels[neighbor] == NOISE),
                        );
                    }
                }
                match stack.pop() {
                    Some(next) => current = next,
                    None => break,
                }
            }
            next_label += 1;
        }

        debug!(
            "DBSCAN(eps={:?}, min_pts={}) found {} clusters, {} noise rows",
            self.epsilon,
            self.min_pts,
            next_label,
            labels.iter().filter(|&&label| label == NOISE).count()
        );

        Ok(labels)
    }
}
