//! PageRank by power iteration over an undirected snapshot.

use std::collections::BTreeMap;

use super::{Graph, NodeId};

/// Parameters for the PageRank power iteration.
///
/// # Examples
/// ```
/// use linkdrift_core::PageRankConfig;
///
/// let config = PageRankConfig::default().with_damping(0.9);
/// assert_eq!(config.damping(), 0.9);
/// assert_eq!(config.max_iterations(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    damping: f64,
    max_iterations: usize,
    tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-9,
        }
    }
}

impl PageRankConfig {
    /// Overrides the damping factor.
    #[must_use]
    pub const fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Overrides the iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Overrides the L1 convergence tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns the damping factor.
    #[must_use]
    pub const fn damping(&self) -> f64 {
        self.damping
    }

    /// Returns the iteration cap.
    #[must_use]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Returns the L1 convergence tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// PageRank scores for every node of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRank {
    scores: BTreeMap<NodeId, f64>,
    iterations: usize,
    converged: bool,
}

impl PageRank {
    /// Returns the score of `node`, or zero when it was not ranked.
    #[must_use]
    pub fn score(&self, node: NodeId) -> f64 {
        self.scores.get(&node).copied().unwrap_or(0.0)
    }

    /// Returns all scores keyed by node.
    #[must_use]
    pub fn scores(&self) -> &BTreeMap<NodeId, f64> {
        &self.scores
    }

    /// Returns the number of power iterations performed.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns whether the iteration met the tolerance before the cap.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl Graph {
    /// Ranks every node with PageRank.
    ///
    /// Each undirected edge carries rank both ways. Rank held by isolated
    /// nodes is redistributed uniformly so the scores always sum to one.
    ///
    /// # Examples
    /// ```
    /// use linkdrift_core::{Graph, NodeId, PageRankConfig};
    ///
    /// let graph = Graph::try_from_pairs(&[(0, 1), (0, 2), (0, 3)])?;
    /// let ranks = graph.pagerank(&PageRankConfig::default());
    /// let total: f64 = ranks.scores().values().sum();
    /// assert!((total - 1.0).abs() < 1e-9);
    /// assert!(ranks.score(NodeId::new(0)) > ranks.score(NodeId::new(1)));
    /// # Ok::<(), linkdrift_core::LinkDriftError>(())
    /// ```
    #[must_use]
    pub fn pagerank(&self, config: &PageRankConfig) -> PageRank {
        let n = self.node_count();
        if n == 0 {
            return PageRank {
                scores: BTreeMap::new(),
                iterations: 0,
                converged: true,
            };
        }

        let index = self.index_map();
        let neighbors: Vec<Vec<usize>> = self
            .nodes()
            .iter()
            .map(|node| {
                self.neighbors(*node)
                    .filter_map(|neighbor| index.get(&neighbor).copied())
                    .collect()
            })
            .collect();

        let size = n as f64;
        let damping = config.damping;
        let teleport = (1.0 - damping) / size;
        let mut ranks = vec![1.0 / size; n];
        let mut next = vec![0.0; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < config.max_iterations {
            iterations += 1;
            let dangling: f64 = neighbors
                .iter()
                .zip(&ranks)
                .filter(|(adjacent, _)| adjacent.is_empty())
                .map(|(_, rank)| rank)
                .sum();
            let dangling_share = damping * dangling / size;

            for (slot, adjacent) in next.iter_mut().zip(&neighbors) {
                let inflow: f64 = adjacent
                    .iter()
                    .map(|&u| ranks[u] / neighbors[u].len() as f64)
                    .sum();
                *slot = teleport + damping * inflow + dangling_share;
            }

            let delta: f64 = ranks
                .iter()
                .zip(&next)
                .map(|(old, new)| (old - new).abs())
                .sum();
            std::mem::swap(&mut ranks, &mut next);
            if delta < config.tolerance {
                converged = true;
                break;
            }
        }

        let scores = self.nodes().iter().copied().zip(ranks).collect();
        PageRank {
            scores,
            iterations,
            converged,
        }
    }
}
