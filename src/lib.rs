/// custseg: customer segmentation over a small tabular dataset.
///
/// The dataset is encoded and clustered once at startup by three strategies (DBSCAN,
/// Ward agglomeration, complete-linkage cut). The trained state is then served read-only:
/// cluster profiles, a PCA projection for plotting, and nearest-neighbour assignment of
/// new customers.
///
/// # Modules
/// - `clustering`: DBSCAN, hierarchical linkage and dendrogram cuts.
/// - `encoder`: frozen feature encoding shared by training and queries.
/// - `model_bank`, `resolver`, `profiler`, `projection`: the trained state and its queries.
/// - `metrics`: silhouette and Calinski-Harabasz scores of each trained partition.
/// - `server`: the HTTP surface.
pub mod clustering;
pub mod config;
pub mod context;
pub mod core;
pub mod dataset;
pub mod distances;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod model_bank;
pub mod profiler;
pub mod projection;
pub mod report;
pub mod resolver;
pub mod server;

pub use config::Config;
pub use context::{SegmentationContext, SegmentationContextBuilder};
pub use model_bank::{ModelBank, Strategy};
