use crate::core::float::SegmentFloat;
use ndarray::{Array1, ArrayView2, Axis};

/// Column-wise mean of the selected rows. Returns zeros when `indices` is empty.
pub fn compute_mean<F: SegmentFloat>(data: &ArrayView2<F>, indices: &[usize]) -> Array1<F> {
    let selected_data = data.select(Axis(0), indices);
    selected_data
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::<F>::zeros(data.ncols()))
}

/// Indices of the rows whose label equals `label`, in ascending order.
pub fn member_indices<L: PartialEq + Copy>(labels: &[L], label: L) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, &l)| l == label)
        .map(|(i, _)| i)
        .collect()
}
