use crate::core::float::SegmentFloat;
use ndarray::ArrayView1;
use ndarray_stats::DeviationExt;
use std::fmt::Debug;

/// Trait defining the interface for distance metrics
pub trait DistanceMetric<F: SegmentFloat>: Send + Sync + Debug {
    /// Computes the distance between two points. Panics if the points have different dimensions.
    fn compute(&self, point1: &ArrayView1<F>, point2: &ArrayView1<F>) -> F;
}

/// [Euclidean Distance](https://en.wikipedia.org/wiki/Euclidean_distance)
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl<F: SegmentFloat> DistanceMetric<F> for EuclideanDistance {
    #[inline]
    fn compute(&self, point1: &ArrayView1<F>, point2: &ArrayView1<F>) -> F {
        SquaredEuclideanDistance.compute(point1, point2).sqrt()
    }
}

/// Squared Euclidean distance. Orders points exactly like [`EuclideanDistance`]
/// without the square root.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclideanDistance;

impl<F: SegmentFloat> DistanceMetric<F> for SquaredEuclideanDistance {
    #[inline]
    fn compute(&self, point1: &ArrayView1<F>, point2: &ArrayView1<F>) -> F {
        point1
            .sq_l2_dist(point2)
            .expect("distance operands must have the same dimension")
    }
}

#[cfg(test)]
mod tests {
    use crate::distances::{DistanceMetric, EuclideanDistance, SquaredEuclideanDistance};
    use ndarray::array;

    #[test]
    fn test_squared_euclidean_distance() {
        let point1 = array![1.0_f64, 2.0, 3.0];
        let point2 = array![4.0, 5.0, 6.0];

        let result = SquaredEuclideanDistance.compute(&point1.view(), &point2.view());
        let expected = 27.0; // (4-1)^2 + (5-2)^2 + (6-3)^2

        assert!((result - expected).abs() < 1e-12, "Expected {}, got {}", expected, result);
    }

    #[test]
    fn test_euclidean_distance() {
        let point1 = array![0.0_f64, 0.0];
        let point2 = array![3.0, 4.0];

        let result = EuclideanDistance.compute(&point1.view(), &point2.view());
        assert!((result - 5.0).abs() < 1e-12, "Expected 5, got {}", result);
    }

    #[test]
    fn test_zero_distance() {
        let point1 = array![1.0, 2.0, 3.0];
        let point2 = array![1.0, 2.0, 3.0];

        let metrics: Vec<Box<dyn DistanceMetric<f64>>> =
            vec![Box::new(SquaredEuclideanDistance), Box::new(EuclideanDistance)];

        for metric in metrics {
            let result = metric.compute(&point1.view(), &point2.view());
            assert!(result.abs() < 1e-12, "Expected 0, got {}", result);
        }
    }
}
