//! Iterated link-prediction simulation.
//!
//! Each iteration trains the scorer on the current snapshot's pair table,
//! swaps edges with [`Rewirer`], and measures the result against the
//! partition fixed at construction. Candidates for addition are scored on a
//! second table built after the removals.

use std::num::NonZeroUsize;

use rand::{SeedableRng, rngs::SmallRng};
use tracing::{Span, field, info, instrument, warn};

use crate::{
    Result,
    error::LinkDriftError,
    features::{FeatureBuilder, FeatureInputs},
    graph::Graph,
    metrics::SnapshotMetrics,
    partition::Partition,
    report::{IterationReport, SimulationReport},
    rewire::Rewirer,
    scorer::Scorer,
};

/// Lifecycle of a [`LinkPredictionSimulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// No iteration has run yet.
    Initialized,
    /// Some iterations completed and more remain.
    Running {
        /// Iterations completed so far.
        completed: usize,
    },
    /// Every configured iteration completed.
    Terminated {
        /// Iterations completed.
        completed: usize,
    },
    /// An iteration failed; the snapshot reflects the last successful one.
    Aborted {
        /// Iteration that failed.
        iteration: usize,
    },
}

/// Runs repeated train, rewire and measure iterations over a snapshot.
///
/// Constructed through [`crate::SimulatorBuilder`].
///
/// # Examples
/// ```
/// use linkdrift_core::{Graph, SimulationState, SimulatorBuilder};
///
/// let graph = Graph::try_from_pairs(&[
///     (0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (3, 5), (4, 5),
/// ])?;
/// let mut simulator = SimulatorBuilder::new()
///     .with_removal_count(1)
///     .with_iterations(2)
///     .build(graph)?;
/// let report = simulator.run()?;
/// assert_eq!(report.iterations().len(), 2);
/// assert_eq!(simulator.graph().edge_count(), 7);
/// assert_eq!(simulator.state(), SimulationState::Terminated { completed: 2 });
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[derive(Debug)]
pub struct LinkPredictionSimulator<S> {
    graph: Graph,
    partition: Partition,
    features: FeatureBuilder,
    scorer: S,
    rewirer: Rewirer,
    iterations: NonZeroUsize,
    seed: u64,
    rng: SmallRng,
    state: SimulationState,
    baseline: SnapshotMetrics,
}

impl<S: Scorer> LinkPredictionSimulator<S> {
    pub(crate) fn new(
        graph: Graph,
        partition: Partition,
        features: FeatureBuilder,
        scorer: S,
        rewirer: Rewirer,
        iterations: NonZeroUsize,
        seed: u64,
    ) -> Result<Self> {
        let baseline = SnapshotMetrics::measure(&graph, &partition)?;
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            communities = partition.community_count(),
            modularity = baseline.modularity,
            degree_inequality = baseline.degree_inequality,
            components = baseline.components,
            "simulator initialised"
        );
        Ok(Self {
            graph,
            partition,
            features,
            scorer,
            rewirer,
            iterations,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            state: SimulationState::Initialized,
            baseline,
        })
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the partition fixed at construction.
    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Returns the scorer as trained by the latest iteration.
    #[must_use]
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Returns the metrics of the initial snapshot.
    #[must_use]
    pub fn baseline(&self) -> SnapshotMetrics {
        self.baseline
    }

    /// Returns the configured iteration count.
    #[must_use]
    pub fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Returns the number of edges swapped per iteration.
    #[must_use]
    pub fn removal_count(&self) -> usize {
        self.rewirer.removal_count()
    }

    /// Returns the seed driving removal and community detection.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs the next iteration.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::SimulationFinished`] once every iteration has
    /// run and [`LinkDriftError::SimulationAborted`] after a failed iteration.
    /// Failures inside an iteration propagate unchanged and abort the run.
    #[instrument(
        name = "simulator.iteration",
        err,
        skip(self),
        fields(iteration = field::Empty, edges = self.graph.edge_count()),
    )]
    pub fn step(&mut self) -> Result<IterationReport> {
        let iteration = match self.state {
            SimulationState::Initialized => 1,
            SimulationState::Running { completed } => completed + 1,
            SimulationState::Terminated { completed } => {
                return Err(LinkDriftError::SimulationFinished {
                    iterations: completed,
                });
            }
            SimulationState::Aborted { iteration } => {
                return Err(LinkDriftError::SimulationAborted { iteration });
            }
        };
        Span::current().record("iteration", iteration);

        match self.run_iteration(iteration) {
            Ok(report) => {
                self.state = if iteration >= self.iterations.get() {
                    SimulationState::Terminated {
                        completed: iteration,
                    }
                } else {
                    SimulationState::Running {
                        completed: iteration,
                    }
                };
                info!(
                    iteration,
                    modularity = report.modularity,
                    degree_inequality = report.degree_inequality,
                    components = report.components,
                    positive_rate = report.positive_rate,
                    "iteration completed"
                );
                Ok(report)
            }
            Err(error) => {
                warn!(
                    iteration,
                    code = error.code().as_str(),
                    "iteration failed, aborting run"
                );
                self.state = SimulationState::Aborted { iteration };
                Err(error)
            }
        }
    }

    /// Runs every remaining iteration.
    ///
    /// The report carries the iterations executed by this call; earlier
    /// [`Self::step`] results are not repeated.
    ///
    /// # Errors
    /// Propagates the first failure from [`Self::step`].
    pub fn run(&mut self) -> Result<SimulationReport> {
        let mut reports = Vec::new();
        while !matches!(self.state, SimulationState::Terminated { .. }) {
            reports.push(self.step()?);
        }
        Ok(SimulationReport::new(self.baseline, reports))
    }

    fn run_iteration(&mut self, iteration: usize) -> Result<IterationReport> {
        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();

        let table = self.features.build_with(
            FeatureInputs::new(self.graph.edges())
                .with_universe(self.graph.nodes())
                .with_reference(&self.graph)
                .with_partition(&self.partition),
        )?;
        self.scorer.fit(&table)?;
        let outcome = self.rewirer.apply(
            &self.graph,
            &self.features,
            &self.partition,
            &self.scorer,
            &mut self.rng,
        )?;
        let measured = SnapshotMetrics::measure(&outcome.graph, &self.partition)?;
        self.graph = outcome.graph;

        #[cfg(feature = "metrics")]
        {
            ::metrics::counter!("linkdrift_iterations_total").increment(1);
            ::metrics::counter!("linkdrift_edges_rewired_total")
                .increment(outcome.added.len() as u64);
            ::metrics::histogram!("linkdrift_iteration_duration_seconds")
                .record(started.elapsed().as_secs_f64());
        }

        Ok(IterationReport {
            iteration,
            training_rows: table.len(),
            positive_rate: table.positive_rate(),
            removed: outcome.removed,
            added: outcome.added,
            modularity: measured.modularity,
            degree_inequality: measured.degree_inequality,
            components: measured.components,
        })
    }
}
