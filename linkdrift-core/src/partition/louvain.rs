//! Louvain modularity optimisation.
//!
//! Each level greedily moves nodes to the neighbouring community with the
//! best modularity gain until a pass makes no move, then collapses
//! communities into super-nodes and repeats on the aggregated graph.

use std::collections::BTreeMap;

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};
use tracing::debug;

use super::Partition;
use crate::graph::Graph;

/// Minimum improvement required before a node changes community.
const MIN_GAIN: f64 = 1e-12;

/// Parameters for Louvain community detection.
///
/// # Examples
/// ```
/// use linkdrift_core::LouvainConfig;
///
/// let config = LouvainConfig::default().with_seed(7).with_resolution(1.5);
/// assert_eq!(config.seed(), 7);
/// assert_eq!(config.resolution(), 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LouvainConfig {
    resolution: f64,
    max_passes: usize,
    max_levels: usize,
    seed: u64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_passes: 32,
            max_levels: 16,
            seed: 0,
        }
    }
}

impl LouvainConfig {
    /// Overrides the modularity resolution.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Overrides the number of local-moving passes per level.
    #[must_use]
    pub const fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Overrides the number of aggregation levels.
    #[must_use]
    pub const fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Overrides the seed driving the node visiting order.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the modularity resolution.
    #[must_use]
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns the seed driving the node visiting order.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Weighted undirected graph over dense indices, with self-loop weights kept
/// apart from the adjacency lists.
struct WeightedGraph {
    adjacency: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
}

impl WeightedGraph {
    fn from_graph(graph: &Graph) -> Self {
        let index = graph.index_map();
        let adjacency = graph
            .nodes()
            .iter()
            .map(|node| {
                graph
                    .neighbors(*node)
                    .filter_map(|neighbor| index.get(&neighbor).map(|&j| (j, 1.0)))
                    .collect()
            })
            .collect();
        Self {
            adjacency,
            loops: vec![0.0; graph.node_count()],
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    fn strengths(&self) -> Vec<f64> {
        self.adjacency
            .iter()
            .zip(&self.loops)
            .map(|(adjacent, self_loop)| {
                adjacent.iter().map(|(_, weight)| weight).sum::<f64>() + 2.0 * self_loop
            })
            .collect()
    }

    fn aggregate(&self, membership: &[usize], count: usize) -> Self {
        let mut loops = vec![0.0; count];
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        for (i, adjacent) in self.adjacency.iter().enumerate() {
            let ci = membership[i];
            loops[ci] += self.loops[i];
            for &(j, weight) in adjacent {
                if j <= i {
                    continue;
                }
                let cj = membership[j];
                if ci == cj {
                    loops[ci] += weight;
                } else {
                    *links[ci].entry(cj).or_default() += weight;
                    *links[cj].entry(ci).or_default() += weight;
                }
            }
        }
        Self {
            adjacency: links
                .into_iter()
                .map(|targets| targets.into_iter().collect())
                .collect(),
            loops,
        }
    }
}

pub(super) fn detect(graph: &Graph, config: &LouvainConfig) -> Partition {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut current = WeightedGraph::from_graph(graph);
    let mut membership: Vec<usize> = (0..current.len()).collect();
    let mut levels = 0;

    while levels < config.max_levels {
        let Some((assignment, count)) = local_moving(&current, config, &mut rng) else {
            break;
        };
        levels += 1;
        for slot in &mut membership {
            *slot = assignment[*slot];
        }
        current = current.aggregate(&assignment, count);
    }

    let partition = Partition::from_labels(graph.nodes().iter().copied().zip(membership));
    debug!(
        nodes = graph.node_count(),
        levels,
        communities = partition.community_count(),
        "louvain detection completed"
    );
    partition
}

/// Runs local moving on one level. Returns the compacted assignment and
/// community count, or `None` when no node moved.
fn local_moving(
    graph: &WeightedGraph,
    config: &LouvainConfig,
    rng: &mut SmallRng,
) -> Option<(Vec<usize>, usize)> {
    let strengths = graph.strengths();
    let two_m: f64 = strengths.iter().sum();
    if two_m <= 0.0 {
        return None;
    }

    let mut community: Vec<usize> = (0..graph.len()).collect();
    let mut totals = strengths.clone();
    let mut order: Vec<usize> = (0..graph.len()).collect();
    let mut moved = false;

    for _ in 0..config.max_passes {
        order.shuffle(rng);
        let mut moved_this_pass = false;
        for &node in &order {
            let current = community[node];
            let strength = strengths[node];
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for &(neighbor, weight) in &graph.adjacency[node] {
                *links.entry(community[neighbor]).or_default() += weight;
            }

            totals[current] -= strength;
            let gain = |target: usize, weight: f64| {
                weight - config.resolution * totals[target] * strength / two_m
            };
            let mut best = current;
            let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
            for (&target, &weight) in &links {
                let candidate = gain(target, weight);
                if candidate > best_gain + MIN_GAIN {
                    best = target;
                    best_gain = candidate;
                }
            }
            totals[best] += strength;
            if best != current {
                community[node] = best;
                moved = true;
                moved_this_pass = true;
            }
        }
        if !moved_this_pass {
            break;
        }
    }

    moved.then(|| compact(&community))
}

fn compact(community: &[usize]) -> (Vec<usize>, usize) {
    let mut relabel: BTreeMap<usize, usize> = BTreeMap::new();
    let assignment = community
        .iter()
        .map(|label| {
            let next = relabel.len();
            *relabel.entry(*label).or_insert(next)
        })
        .collect();
    (assignment, relabel.len())
}
