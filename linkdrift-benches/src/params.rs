//! Benchmark parameter types.

use std::fmt;

/// Parameters for a pair-table benchmark run.
#[derive(Clone, Debug)]
pub struct GraphBenchParams {
    /// Number of nodes in the graph.
    pub node_count: usize,
    /// Number of edges in the graph.
    pub edge_count: usize,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},m={}", self.node_count, self.edge_count)
    }
}

/// Parameters for a simulator iteration benchmark run.
#[derive(Clone, Debug)]
pub struct SimulationBenchParams {
    /// Number of nodes in the graph.
    pub node_count: usize,
    /// Edges removed and added per iteration.
    pub removal_count: usize,
}

impl fmt::Display for SimulationBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},r={}", self.node_count, self.removal_count)
    }
}
