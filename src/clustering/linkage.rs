//! Bottom-up hierarchical agglomeration.
//!
//! Every row starts as its own cluster; each step merges the closest active pair and
//! updates the distance matrix with the Lance–Williams recurrence of the chosen
//! [`LinkageMethod`]. The full merge history is returned as a [`Dendrogram`], which the
//! callers cut into flat clusters.

use super::dendrogram::{Dendrogram, Merge};
use crate::core::float::SegmentFloat;
use crate::distances::{DistanceMetric, EuclideanDistance};
use crate::error::ClusterError;
use log::debug;
use ndarray::ArrayView2;
use rayon::prelude::*;

/// Linkage method for hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkageMethod {
    /// Maximum pairwise distance between members.
    Complete,
    /// Minimise the increase of within-cluster variance (requires Euclidean input).
    Ward,
}

#[inline]
fn as_float<F: SegmentFloat>(value: usize) -> F {
    // Lossy for huge counts on f32, never fails for f32/f64.
    F::from_usize(value).unwrap_or_else(F::max_value)
}

/// Dense symmetric Euclidean distance matrix, row-major.
fn pairwise_distances<F: SegmentFloat>(data: &ArrayView2<F>) -> Vec<F> {
    let n = data.nrows();
    (0..n * n)
        .into_par_iter()
        .map(|k| {
            let (i, j) = (k / n, k % n);
            EuclideanDistance.compute(&data.row(i), &data.row(j))
        })
        .collect()
}

/// Closest active pair `(i, j)` with `i < j`. Ties keep the first pair in row-major order.
fn closest_pair<F: SegmentFloat>(dists: &[F], active: &[bool], n: usize) -> Option<(usize, usize, F)> {
    let mut best: Option<(usize, usize, F)> = None;
    for i in (0..n).filter(|&i| active[i]) {
        for j in (i + 1..n).filter(|&j| active[j]) {
            let d = dists[i * n + j];
            match best {
                Some((_, _, best_d)) if !(d < best_d) => {}
                _ => best = Some((i, j, d)),
            }
        }
    }
    best
}

/// Agglomerate the rows of `data` until one cluster remains.
pub fn linkage<F: SegmentFloat>(
    data: &ArrayView2<F>,
    method: LinkageMethod,
) -> Result<Dendrogram<F>, ClusterError> {
    let n = data.nrows();
    if n == 0 {
        return Err(ClusterError::EmptyInput);
    }
    if n < 2 {
        return Err(ClusterError::InsufficientSamples {
            required: 2,
            found: n,
        });
    }

    let mut dists = pairwise_distances(data);
    let mut active = vec![true; n];
    let mut sizes = vec![1usize; n];
    // Dendrogram node currently living in each slot.
    let mut node_of_slot: Vec<usize> = (0..n).collect();
    let mut merges: Vec<Merge<F>> = Vec::with_capacity(n - 1);

    for step in 0..n - 1 {
        let (i, j, d_ij) = match closest_pair(&dists, &active, n) {
            Some(pair) => pair,
            None => break,
        };

        let (size_i, size_j) = (sizes[i], sizes[j]);
        let (a, b) = (node_of_slot[i], node_of_slot[j]);
        merges.push(Merge {
            left: a.min(b),
            right: a.max(b),
            distance: d_ij,
            size: size_i + size_j,
        });

        for k in (0..n).filter(|&k| active[k] && k != i && k != j) {
            let d_ik = dists[i * n + k];
            let d_jk = dists[j * n + k];
            let updated = match method {
                LinkageMethod::Complete => d_ik.max(d_jk),
                LinkageMethod::Ward => {
                    let (n_i, n_j, n_k) = (
                        as_float::<F>(size_i),
                        as_float::<F>(size_j),
                        as_float::<F>(sizes[k]),
                    );
                    let numer = (n_i + n_k) * d_ik * d_ik + (n_j + n_k) * d_jk * d_jk
                        - n_k * d_ij * d_ij;
                    (numer / (n_i + n_j + n_k)).max(F::zero()).sqrt()
                }
            };
            dists[i * n + k] = updated;
            dists[k * n + i] = updated;
        }

        sizes[i] = size_i + size_j;
        active[j] = false;
        node_of_slot[i] = n + step;
    }

    debug!(
        "{:?} linkage over {} rows, final merge height {:?}",
        method,
        n,
        merges.last().map(|m| m.distance)
    );

    Ok(Dendrogram::new(n, merges))
}
