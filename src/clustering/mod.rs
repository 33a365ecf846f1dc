pub mod dbscan;
pub mod dendrogram;
pub mod linkage;
mod union_find;
pub mod utils;

pub use dbscan::Dbscan;
pub use dendrogram::{Dendrogram, Merge};
pub use linkage::{linkage, LinkageMethod};

/// Cluster label assigned to a training row.
pub type ClusterId = i32;

/// Label of rows that belong to no cluster.
pub const NOISE: ClusterId = -1;
