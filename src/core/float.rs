use num_traits::{Float, FromPrimitive, Signed};
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::AddAssign;

// Numeric bound for the generic clustering algorithms. ndarray-stats needs
// `AddAssign + Signed` for its deviation helpers, rayon needs `Send + Sync`.
pub trait SegmentFloat:
    Float + Debug + Default + AddAssign + Sum + Signed + FromPrimitive + Copy + Send + Sync + 'static
{
}

impl SegmentFloat for f32 {}
impl SegmentFloat for f64 {}
