//! Builder utilities for configuring link-prediction simulations.
//!
//! Collects the rewiring parameters, ranking and scoring settings, and the
//! optional fixed partition, then validates them against an initial snapshot
//! before constructing a [`LinkPredictionSimulator`].

use std::num::NonZeroUsize;

use tracing::instrument;

use crate::{
    Result,
    error::LinkDriftError,
    features::FeatureBuilder,
    graph::{Graph, PageRankConfig},
    partition::{LouvainConfig, Partition},
    rewire::{RewireStage, Rewirer},
    scorer::{LogisticConfig, LogisticRegression, Scorer},
    simulator::LinkPredictionSimulator,
};

/// Configures and constructs [`LinkPredictionSimulator`] instances.
///
/// # Examples
/// ```
/// use linkdrift_core::{Graph, SimulatorBuilder};
///
/// let graph = Graph::try_from_pairs(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)])?;
/// let simulator = SimulatorBuilder::new()
///     .with_removal_count(1)
///     .with_iterations(3)
///     .with_seed(42)
///     .build(graph)?;
/// assert_eq!(simulator.iterations().get(), 3);
/// assert_eq!(simulator.removal_count(), 1);
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SimulatorBuilder {
    removal_count: usize,
    iterations: usize,
    seed: u64,
    pagerank: PageRankConfig,
    louvain: LouvainConfig,
    logistic: LogisticConfig,
    partition: Option<Partition>,
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self {
            removal_count: 5,
            iterations: 10,
            seed: 0,
            pagerank: PageRankConfig::default(),
            louvain: LouvainConfig::default(),
            logistic: LogisticConfig::default(),
            partition: None,
        }
    }
}

impl SimulatorBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use linkdrift_core::SimulatorBuilder;
    ///
    /// let builder = SimulatorBuilder::new();
    /// assert_eq!(builder.removal_count(), 5);
    /// assert_eq!(builder.iterations(), 10);
    /// assert_eq!(builder.seed(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of edges swapped per iteration.
    #[must_use]
    pub fn with_removal_count(mut self, removal_count: usize) -> Self {
        self.removal_count = removal_count;
        self
    }

    /// Returns the configured removal count.
    #[must_use]
    pub fn removal_count(&self) -> usize {
        self.removal_count
    }

    /// Overrides the number of iterations.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Returns the configured iteration count.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Seeds edge removal and community detection.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the configured seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Overrides the PageRank parameters used for features.
    #[must_use]
    pub fn with_pagerank(mut self, pagerank: PageRankConfig) -> Self {
        self.pagerank = pagerank;
        self
    }

    /// Overrides the community-detection parameters. The seed is always
    /// taken from [`Self::with_seed`].
    #[must_use]
    pub fn with_louvain(mut self, louvain: LouvainConfig) -> Self {
        self.louvain = louvain;
        self
    }

    /// Overrides the logistic-regression parameters used by [`Self::build`].
    #[must_use]
    pub fn with_logistic(mut self, logistic: LogisticConfig) -> Self {
        self.logistic = logistic;
        self
    }

    /// Fixes the partition instead of detecting one on the initial snapshot.
    #[must_use]
    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = Some(partition);
        self
    }

    /// Validates the configuration and constructs a simulator driven by
    /// [`LogisticRegression`].
    ///
    /// # Errors
    /// Returns [`LinkDriftError::InvalidScorerConfig`] for unusable logistic
    /// parameters, plus every error listed on [`Self::build_with_scorer`].
    pub fn build(self, graph: Graph) -> Result<LinkPredictionSimulator<LogisticRegression>> {
        let scorer = LogisticRegression::new(self.logistic)?;
        self.build_with_scorer(graph, scorer)
    }

    /// Validates the configuration and constructs a simulator driven by
    /// `scorer`.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::InvalidRemovalCount`] or
    /// [`LinkDriftError::InvalidIterations`] for zero counts,
    /// [`LinkDriftError::EmptyGraph`] when `graph` has no edges,
    /// [`LinkDriftError::InsufficientCandidates`] when the removal count
    /// exceeds the edge count and [`LinkDriftError::UnpartitionedNode`] when
    /// a fixed partition misses a node.
    #[instrument(
        name = "simulator.build",
        err,
        skip_all,
        fields(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            removals = self.removal_count,
            iterations = self.iterations,
            seed = self.seed,
        ),
    )]
    pub fn build_with_scorer<S: Scorer>(
        self,
        graph: Graph,
        scorer: S,
    ) -> Result<LinkPredictionSimulator<S>> {
        let rewirer = Rewirer::new(self.removal_count)?;
        let iterations = NonZeroUsize::new(self.iterations).ok_or(
            LinkDriftError::InvalidIterations {
                got: self.iterations,
            },
        )?;
        if graph.edge_count() == 0 {
            return Err(LinkDriftError::EmptyGraph {
                nodes: graph.node_count(),
            });
        }
        if rewirer.removal_count() > graph.edge_count() {
            return Err(LinkDriftError::InsufficientCandidates {
                stage: RewireStage::Removal,
                requested: rewirer.removal_count(),
                available: graph.edge_count(),
            });
        }

        let features = FeatureBuilder::new()
            .with_pagerank(self.pagerank)
            .with_louvain(self.louvain.with_seed(self.seed));
        let partition = match self.partition {
            Some(partition) => {
                partition.ensure_covers(graph.nodes())?;
                partition
            }
            None => features.detect_partition(&graph),
        };

        LinkPredictionSimulator::new(
            graph, partition, features, scorer, rewirer, iterations, self.seed,
        )
    }
}
