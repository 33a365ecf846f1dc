//! Out-of-sample assignment by nearest-neighbour label borrowing.
//!
//! None of the strategies can place a new point on its own, so every strategy resolves a
//! query the same way: find the closest training row and return that row's label. This is
//! an approximation. Re-running DBSCAN with the query inserted, for instance, can give a
//! different answer (a query next to a noise row is reported as noise even if it would
//! make that row core).

use crate::clustering::{ClusterId, NOISE};
use crate::distances::{DistanceMetric, EuclideanDistance};
use crate::error::ResolveError;
use crate::model_bank::Strategy;
use log::debug;
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::Serialize;

/// Outcome of resolving one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assignment {
    #[serde(serialize_with = "serialize_strategy")]
    pub strategy: Strategy,
    pub cluster_id: ClusterId,
    /// Training row whose label was borrowed.
    pub nearest_index: usize,
    pub distance: f64,
}

fn serialize_strategy<S: serde::Serializer>(strategy: &Strategy, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(strategy.name())
}

impl Assignment {
    pub fn is_noise(&self) -> bool {
        self.cluster_id == NOISE
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentResolver<D = EuclideanDistance> {
    metric: D,
}

impl AssignmentResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: DistanceMetric<f64>> AssignmentResolver<D> {
    pub fn with_metric(metric: D) -> Self {
        Self { metric }
    }

    /// Index and distance of the training row closest to `query`. Ties go to the lowest index.
    pub fn nearest_row(
        &self,
        query: &ArrayView1<f64>,
        x: &ArrayView2<f64>,
    ) -> Result<(usize, f64), ResolveError> {
        if x.nrows() == 0 {
            return Err(ResolveError::EmptyTrainingSet);
        }
        if query.len() != x.ncols() {
            return Err(ResolveError::DimensionMismatch {
                expected: x.ncols(),
                found: query.len(),
            });
        }
        if let Some(index) = query.iter().position(|value| !value.is_finite()) {
            return Err(ResolveError::NonFiniteQuery { index });
        }

        (0..x.nrows())
            .into_par_iter()
            .map(|i| (i, self.metric.compute(query, &x.row(i))))
            .reduce_with(|a, b| {
                // Total order on (distance, index) keeps the reduction deterministic.
                match a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)) {
                    std::cmp::Ordering::Greater => b,
                    _ => a,
                }
            })
            .ok_or(ResolveError::EmptyTrainingSet)
    }

    /// Borrow the label of the training row nearest to `query`.
    pub fn assign(
        &self,
        query: &ArrayView1<f64>,
        strategy: Strategy,
        x: &ArrayView2<f64>,
        labels: &[ClusterId],
    ) -> Result<Assignment, ResolveError> {
        if labels.len() != x.nrows() {
            return Err(ResolveError::LabelLengthMismatch {
                labels: labels.len(),
                rows: x.nrows(),
            });
        }

        let (nearest_index, distance) = self.nearest_row(query, x)?;
        let assignment = Assignment {
            strategy,
            cluster_id: labels[nearest_index],
            nearest_index,
            distance,
        };
        debug!(
            "{} assigned query to cluster {} via row {} (distance {:.4})",
            strategy, assignment.cluster_id, nearest_index, distance
        );
        Ok(assignment)
    }
}
