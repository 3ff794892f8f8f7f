//! Seeded planted-partition graphs for benchmarks.
//!
//! Nodes are grouped into equally sized communities. Each pair inside a
//! community becomes an edge with probability `p_in`; each pair across
//! communities with probability `p_out`.

use linkdrift_core::{EdgeSource, EdgeSourceError, NodeId, Partition};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

/// Errors raised while generating a synthetic graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntheticError {
    /// No communities were requested.
    #[error("community count must be positive")]
    ZeroCommunities,
    /// Communities were requested without members.
    #[error("community size must be positive")]
    ZeroCommunitySize,
    /// An edge probability was outside `[0, 1]`.
    #[error("{name} must lie in [0, 1] (got {value})")]
    InvalidProbability {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected probability.
        value: f64,
    },
}

/// Parameters for [`PlantedPartition::generate`].
#[derive(Clone, Copy, Debug)]
pub struct PlantedPartitionConfig {
    /// Number of communities.
    pub communities: usize,
    /// Members per community.
    pub community_size: usize,
    /// Edge probability for pairs in the same community.
    pub p_in: f64,
    /// Edge probability for pairs in different communities.
    pub p_out: f64,
    /// Seed for the edge draws.
    pub seed: u64,
}

/// Synthetic contact graph with a known community structure.
#[derive(Clone, Debug)]
pub struct PlantedPartition {
    name: String,
    pairs: Vec<(NodeId, NodeId)>,
    partition: Partition,
}

impl PlantedPartition {
    /// Draws a planted-partition graph.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when a count is zero or a probability lies
    /// outside `[0, 1]`.
    pub fn generate(config: &PlantedPartitionConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let mut labels: Vec<(NodeId, usize)> = Vec::new();
        let mut next_id: u64 = 0;
        for community in 0..config.communities {
            for _ in 0..config.community_size {
                labels.push((NodeId::new(next_id), community));
                next_id += 1;
            }
        }

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut pairs = Vec::new();
        for (position, &(source, source_community)) in labels.iter().enumerate() {
            for &(target, target_community) in labels.iter().skip(position + 1) {
                let probability = if source_community == target_community {
                    config.p_in
                } else {
                    config.p_out
                };
                if rng.gen_bool(probability) {
                    pairs.push((source, target));
                }
            }
        }

        Ok(Self {
            name: format!(
                "planted-{}x{}",
                config.communities, config.community_size
            ),
            pairs,
            partition: Partition::from_labels(labels),
        })
    }

    /// Returns the planted community of every node.
    #[must_use]
    pub const fn partition(&self) -> &Partition {
        &self.partition
    }
}

impl EdgeSource for PlantedPartition {
    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observation(&self, index: usize) -> Result<(NodeId, NodeId), EdgeSourceError> {
        self.pairs
            .get(index)
            .copied()
            .ok_or(EdgeSourceError::OutOfBounds { index })
    }
}

fn validate(config: &PlantedPartitionConfig) -> Result<(), SyntheticError> {
    if config.communities == 0 {
        return Err(SyntheticError::ZeroCommunities);
    }
    if config.community_size == 0 {
        return Err(SyntheticError::ZeroCommunitySize);
    }
    for (name, value) in [("p_in", config.p_in), ("p_out", config.p_out)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SyntheticError::InvalidProbability { name, value });
        }
    }
    Ok(())
}
