//! The three frozen partitions of the training matrix.

use crate::clustering::{linkage, ClusterId, Dbscan, Dendrogram, LinkageMethod, NOISE};
use crate::config::ClusteringConfig;
use crate::error::ClusterError;
use crate::metrics::{self, format_score, QualityScores};
use log::info;
use ndarray::ArrayView2;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Clustering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// DBSCAN over the encoded rows; may emit [`NOISE`].
    Density,
    /// Ward linkage cut into a fixed number of clusters.
    Agglomerative,
    /// Complete linkage cut by the "at most k groups" criterion.
    Divisive,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Density, Strategy::Agglomerative, Strategy::Divisive];

    /// Name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Density => "dbscan",
            Strategy::Agglomerative => "agglomerative",
            Strategy::Divisive => "divisive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label vectors of every strategy, aligned with the rows of the training matrix.
#[derive(Debug, Clone)]
pub struct ModelBank {
    n_rows: usize,
    density: Vec<ClusterId>,
    agglomerative: Vec<ClusterId>,
    divisive: Vec<ClusterId>,
    ward_tree: Dendrogram<f64>,
    complete_tree: Dendrogram<f64>,
    quality: BTreeMap<Strategy, QualityScores>,
}

impl ModelBank {
    /// Smallest training set every strategy can partition with `config`.
    pub fn min_samples(config: &ClusteringConfig) -> usize {
        2usize
            .max(config.agglomerative.n_clusters)
            .max(config.divisive.n_clusters)
    }

    /// Fit all three strategies on `x`.
    pub fn train(x: &ArrayView2<f64>, config: &ClusteringConfig) -> Result<Self, ClusterError> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            return Err(ClusterError::EmptyInput);
        }
        let required = Self::min_samples(config);
        if n_rows < required {
            return Err(ClusterError::InsufficientSamples {
                required,
                found: n_rows,
            });
        }

        let dbscan = Dbscan::new(config.density.eps, config.density.min_pts);
        let (density, (ward_tree, complete_tree)) = rayon::join(
            || dbscan.fit_predict(x),
            || {
                rayon::join(
                    || linkage(x, LinkageMethod::Ward),
                    || linkage(x, LinkageMethod::Complete),
                )
            },
        );
        let (density, ward_tree, complete_tree) = (density?, ward_tree?, complete_tree?);

        let agglomerative = ward_tree
            .cut_tree(config.agglomerative.n_clusters)?
            .into_iter()
            .map(|label| label as ClusterId)
            .collect();
        // fcluster numbers clusters from 1.
        let divisive = complete_tree
            .fcluster_maxclust(config.divisive.n_clusters)?
            .into_iter()
            .map(|label| label as ClusterId - 1)
            .collect();

        let mut bank = Self {
            n_rows,
            density,
            agglomerative,
            divisive,
            ward_tree,
            complete_tree,
            quality: BTreeMap::new(),
        };

        for strategy in Strategy::ALL {
            let labels = bank.labels(strategy);
            let quality = metrics::score(x, labels);
            info!(
                "{}: {} clusters, {} noise rows, silhouette={}, calinski_harabasz={}",
                strategy,
                bank.cluster_ids(strategy).len(),
                labels.iter().filter(|&&label| label == NOISE).count(),
                format_score(quality.silhouette, 3),
                format_score(quality.calinski_harabasz, 1)
            );
            bank.quality.insert(strategy, quality);
        }

        Ok(bank)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn labels(&self, strategy: Strategy) -> &[ClusterId] {
        match strategy {
            Strategy::Density => &self.density,
            Strategy::Agglomerative => &self.agglomerative,
            Strategy::Divisive => &self.divisive,
        }
    }

    /// Distinct cluster ids of `strategy`, ascending, noise excluded.
    pub fn cluster_ids(&self, strategy: Strategy) -> Vec<ClusterId> {
        self.labels(strategy)
            .iter()
            .copied()
            .filter(|&label| label != NOISE)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Silhouette and Calinski-Harabasz scores of `strategy`, noise rows excluded.
    pub fn quality(&self, strategy: Strategy) -> QualityScores {
        self.quality.get(&strategy).copied().unwrap_or_default()
    }

    /// Merge tree behind a hierarchical strategy.
    pub fn dendrogram(&self, strategy: Strategy) -> Option<&Dendrogram<f64>> {
        match strategy {
            Strategy::Density => None,
            Strategy::Agglomerative => Some(&self.ward_tree),
            Strategy::Divisive => Some(&self.complete_tree),
        }
    }
}
