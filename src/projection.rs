//! Two-component PCA of the training matrix for plotting.

use crate::clustering::ClusterId;
use crate::error::ProjectionError;
use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;

/// Number of projected dimensions.
pub const N_COMPONENTS: usize = 2;

/// Rows of the training matrix in principal-component coordinates.
#[derive(Debug, Clone)]
pub struct Projection {
    /// `N x 2` coordinates, aligned with the training rows.
    pub points: Array2<f64>,
    /// `2 x F` unit loadings, one row per component.
    pub components: Array2<f64>,
    /// Share of total variance captured by each component.
    pub explained_variance: [f64; N_COMPONENTS],
}

impl Projection {
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: ClusterId,
}

/// Fit a fresh PCA on `x` and project every row.
///
/// The covariance uses an `N - 1` denominator. Components are ordered by descending
/// eigenvalue and each is oriented so its largest-magnitude loading is positive.
pub fn project(x: &ArrayView2<f64>) -> Result<Projection, ProjectionError> {
    let (n_samples, n_features) = x.dim();
    if n_samples < 2 {
        return Err(ProjectionError::TooFewSamples {
            required: 2,
            found: n_samples,
        });
    }
    if n_features < N_COMPONENTS {
        return Err(ProjectionError::TooFewFeatures {
            required: N_COMPONENTS,
            found: n_features,
        });
    }

    let mean = x
        .mean_axis(Axis(0))
        .ok_or(ProjectionError::TooFewSamples {
            required: 2,
            found: n_samples,
        })?;
    let centered = x - &mean;
    let cov = centered.t().dot(&centered) / (n_samples - 1) as f64;

    let cov_matrix = DMatrix::from_fn(n_features, n_features, |i, j| cov[[i, j]]);
    let eigen = SymmetricEigen::new(cov_matrix);
    let eigenvalues = eigen.eigenvalues;
    let eigenvectors = eigen.eigenvectors;

    let mut order: Vec<usize> = (0..n_features).collect();
    order.sort_by(|&a, &b| {
        eigenvalues[b]
            .partial_cmp(&eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut components = Array2::<f64>::zeros((N_COMPONENTS, n_features));
    for (row, &idx) in order.iter().take(N_COMPONENTS).enumerate() {
        let mut pivot = 0;
        for j in 0..n_features {
            if eigenvectors[(j, idx)].abs() > eigenvectors[(pivot, idx)].abs() {
                pivot = j;
            }
        }
        let sign = if eigenvectors[(pivot, idx)] < 0.0 { -1.0 } else { 1.0 };
        for j in 0..n_features {
            components[[row, j]] = sign * eigenvectors[(j, idx)];
        }
    }

    let total_variance: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();
    let mut explained_variance = [0.0; N_COMPONENTS];
    if total_variance > 0.0 {
        for (slot, &idx) in explained_variance.iter_mut().zip(order.iter()) {
            *slot = eigenvalues[idx].max(0.0) / total_variance;
        }
    }

    let points = centered.dot(&components.t());
    debug!(
        "PCA over {}x{} matrix, explained variance ratio {:?}",
        n_samples, n_features, explained_variance
    );

    Ok(Projection {
        points,
        components,
        explained_variance,
    })
}

/// Pair each projected row with its label.
pub fn label_points(
    projection: &Projection,
    labels: &[ClusterId],
) -> Result<Vec<ProjectedPoint>, ProjectionError> {
    if projection.len() != labels.len() {
        return Err(ProjectionError::LengthMismatch {
            points: projection.len(),
            labels: labels.len(),
        });
    }
    Ok(projection
        .points
        .rows()
        .into_iter()
        .zip(labels)
        .map(|(row, &cluster)| ProjectedPoint {
            x: row[0],
            y: row[1],
            cluster,
        })
        .collect())
}
