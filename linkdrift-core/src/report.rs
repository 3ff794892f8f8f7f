//! Per-iteration and whole-run simulation reports.

use crate::{graph::Edge, metrics::SnapshotMetrics};

/// Outcome of one simulator iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// One-based iteration number.
    pub iteration: usize,
    /// Rows in the training table.
    pub training_rows: usize,
    /// Share of training rows that were observed edges.
    pub positive_rate: f64,
    /// Edges removed by the rewiring step.
    pub removed: Vec<Edge>,
    /// Edges added by the rewiring step.
    pub added: Vec<Edge>,
    /// Modularity of the rewired snapshot under the fixed partition.
    pub modularity: f64,
    /// Degree inequality of the rewired snapshot.
    pub degree_inequality: f64,
    /// Connected components of the rewired snapshot.
    pub components: usize,
}

impl IterationReport {
    /// Returns the snapshot metrics after rewiring.
    #[must_use]
    pub const fn metrics(&self) -> SnapshotMetrics {
        SnapshotMetrics {
            modularity: self.modularity,
            degree_inequality: self.degree_inequality,
            components: self.components,
        }
    }

    /// Returns the number of added edges that were also removed this
    /// iteration.
    #[must_use]
    pub fn readded(&self) -> usize {
        self.added
            .iter()
            .filter(|edge| self.removed.contains(edge))
            .count()
    }
}

/// Baseline metrics plus one report per completed iteration.
///
/// # Examples
/// ```
/// use linkdrift_core::{SimulationReport, SnapshotMetrics};
///
/// let baseline = SnapshotMetrics { modularity: 0.4, degree_inequality: 0.1, components: 1 };
/// let report = SimulationReport::new(baseline, Vec::new());
/// assert_eq!(report.final_metrics(), baseline);
/// assert!(report.modularity_series().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    baseline: SnapshotMetrics,
    iterations: Vec<IterationReport>,
}

impl SimulationReport {
    /// Assembles a report from its parts.
    #[must_use]
    pub fn new(baseline: SnapshotMetrics, iterations: Vec<IterationReport>) -> Self {
        Self {
            baseline,
            iterations,
        }
    }

    /// Returns the metrics of the initial snapshot.
    #[must_use]
    pub fn baseline(&self) -> SnapshotMetrics {
        self.baseline
    }

    /// Returns the iteration reports in order.
    #[must_use]
    pub fn iterations(&self) -> &[IterationReport] {
        &self.iterations
    }

    /// Returns the metrics after the last iteration, or the baseline when no
    /// iteration ran.
    #[must_use]
    pub fn final_metrics(&self) -> SnapshotMetrics {
        self.iterations
            .last()
            .map_or(self.baseline, IterationReport::metrics)
    }

    /// Returns the modularity after each iteration.
    #[must_use]
    pub fn modularity_series(&self) -> Vec<f64> {
        self.iterations
            .iter()
            .map(|report| report.modularity)
            .collect()
    }

    /// Returns the degree inequality after each iteration.
    #[must_use]
    pub fn degree_inequality_series(&self) -> Vec<f64> {
        self.iterations
            .iter()
            .map(|report| report.degree_inequality)
            .collect()
    }
}
