//! Merge history of a hierarchical clustering and the flat cuts taken from it.
//!
//! Node ids follow the usual linkage-matrix convention: leaves are `0..n`, and the
//! cluster created by merge `s` is node `n + s`.

use super::union_find::UnionFind;
use crate::core::float::SegmentFloat;
use crate::error::ClusterError;

/// One agglomeration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge<F> {
    /// Smaller node id of the merged pair.
    pub left: usize,
    /// Larger node id of the merged pair.
    pub right: usize,
    /// Linkage distance at which the pair merged.
    pub distance: F,
    /// Number of leaves under the new node.
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct Dendrogram<F> {
    n_leaves: usize,
    merges: Vec<Merge<F>>,
}

impl<F: SegmentFloat> Dendrogram<F> {
    pub fn new(n_leaves: usize, merges: Vec<Merge<F>>) -> Self {
        Self { n_leaves, merges }
    }

    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn merges(&self) -> &[Merge<F>] {
        &self.merges
    }

    fn check_n_clusters(n_clusters: usize) -> Result<(), ClusterError> {
        if n_clusters == 0 {
            return Err(ClusterError::InvalidParameter {
                name: "n_clusters",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Leaves in left-to-right dendrogram order (depth-first, left child first).
    pub fn leaves_list(&self) -> Vec<usize> {
        let n = self.n_leaves;
        if self.merges.is_empty() {
            return (0..n).collect();
        }

        let mut order = Vec::with_capacity(n);
        let mut stack = vec![n + self.merges.len() - 1];
        while let Some(node) = stack.pop() {
            if node < n {
                order.push(node);
            } else {
                let merge = &self.merges[node - n];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        order
    }

    /// Flat clustering from the first `n - n_clusters` merges.
    ///
    /// Labels are `0..n_clusters`, numbered by the first row (in row order) of each cluster.
    pub fn cut_tree(&self, n_clusters: usize) -> Result<Vec<usize>, ClusterError> {
        Self::check_n_clusters(n_clusters)?;
        let n = self.n_leaves;
        if n_clusters > n {
            return Err(ClusterError::InsufficientSamples {
                required: n_clusters,
                found: n,
            });
        }

        let applied = (n - n_clusters).min(self.merges.len());
        let mut uf = UnionFind::new(n + self.merges.len());
        for (step, merge) in self.merges[..applied].iter().enumerate() {
            uf.union(n + step, merge.left);
            uf.union(n + step, merge.right);
        }

        let roots: Vec<usize> = (0..n).map(|leaf| uf.find(leaf)).collect();
        Ok(number_by_first_appearance(&roots, 0..n, 0))
    }

    /// Flat clustering into at most `n_clusters` groups, cutting at the lowest height
    /// that achieves it.
    ///
    /// Each node's height is the largest merge distance in its subtree, so heights are
    /// monotone even for non-monotone linkages. Labels are 1-based and numbered in
    /// [`leaves_list`](Self::leaves_list) order. With `n_clusters >= n` every row is its
    /// own cluster.
    pub fn fcluster_maxclust(&self, n_clusters: usize) -> Result<Vec<usize>, ClusterError> {
        Self::check_n_clusters(n_clusters)?;
        let n = self.n_leaves;

        let max_dist = self.max_distances();
        let mut thresholds = max_dist.clone();
        thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let threshold = if n <= n_clusters {
            None
        } else {
            thresholds.iter().copied().find(|&t| {
                let merged = max_dist.iter().filter(|&&d| d <= t).count();
                n - merged <= n_clusters
            })
        };

        let mut uf = UnionFind::new(n + self.merges.len());
        if let Some(t) = threshold {
            for (step, merge) in self.merges.iter().enumerate() {
                if max_dist[step] <= t {
                    uf.union(n + step, merge.left);
                    uf.union(n + step, merge.right);
                }
            }
        }

        let roots: Vec<usize> = (0..n).map(|leaf| uf.find(leaf)).collect();
        Ok(number_by_first_appearance(&roots, self.leaves_list(), 1))
    }

    /// Largest merge distance in the subtree of each internal node.
    fn max_distances(&self) -> Vec<F> {
        let n = self.n_leaves;
        let mut max_dist: Vec<F> = Vec::with_capacity(self.merges.len());
        for merge in &self.merges {
            let mut height = merge.distance;
            for child in [merge.left, merge.right] {
                if child >= n {
                    height = height.max(max_dist[child - n]);
                }
            }
            max_dist.push(height);
        }
        max_dist
    }
}

/// Relabel `roots` with consecutive ids starting at `first`, assigned in `visit` order.
fn number_by_first_appearance(
    roots: &[usize],
    visit: impl IntoIterator<Item = usize>,
    first: usize,
) -> Vec<usize> {
    let mut ids: Vec<Option<usize>> = vec![None; roots.len()];
    let mut by_root = std::collections::HashMap::new();
    for leaf in visit {
        let next = first + by_root.len();
        let id = *by_root.entry(roots[leaf]).or_insert(next);
        ids[leaf] = Some(id);
    }
    ids.into_iter().map(|id| id.unwrap_or(first)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::linkage::{linkage, LinkageMethod};
    use ndarray::array;

    fn sample_tree() -> Dendrogram<f64> {
        let data = array![[0.0], [1.0], [5.0], [6.0], [20.0]];
        linkage(&data.view(), LinkageMethod::Complete).unwrap()
    }

    #[test]
    fn test_leaves_list() {
        assert_eq!(sample_tree().leaves_list(), vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn test_fcluster_maxclust() {
        let tree = sample_tree();
        assert_eq!(tree.fcluster_maxclust(3).unwrap(), vec![2, 2, 3, 3, 1]);
        assert_eq!(tree.fcluster_maxclust(2).unwrap(), vec![2, 2, 2, 2, 1]);
        assert_eq!(tree.fcluster_maxclust(1).unwrap(), vec![1; 5]);
    }

    #[test]
    fn test_fcluster_more_clusters_than_rows() {
        let labels = sample_tree().fcluster_maxclust(9).unwrap();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
        // Leaf 4 comes first in dendrogram order.
        assert_eq!(labels[4], 1);
    }

    #[test]
    fn test_cut_tree() {
        let tree = sample_tree();
        assert_eq!(tree.cut_tree(2).unwrap(), vec![0, 0, 0, 0, 1]);
        assert_eq!(tree.cut_tree(3).unwrap(), vec![0, 0, 1, 1, 2]);
        assert_eq!(tree.cut_tree(5).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_invalid_cluster_counts() {
        let tree = sample_tree();
        assert!(tree.cut_tree(0).is_err());
        assert!(tree.cut_tree(6).is_err());
        assert!(tree.fcluster_maxclust(0).is_err());
    }
}
