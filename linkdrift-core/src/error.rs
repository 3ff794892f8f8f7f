//! Error types for the linkdrift core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{graph::NodeId, metrics::MetricKind, rewire::RewireStage};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by [`crate::EdgeSource`] implementations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum EdgeSourceError {
    /// The source yielded no edges.
    #[error("edge source contains no edges")]
    EmptySource,
    /// An observation connected a node to itself.
    #[error("observation {index} connects node {node} to itself")]
    SelfLoop {
        /// Position of the offending observation.
        index: usize,
        /// Node named on both ends of the observation.
        node: NodeId,
    },
    /// Requested observation index was outside the source's bounds.
    #[error("observation index {index} is out of bounds")]
    OutOfBounds {
        /// The requested observation.
        index: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`EdgeSourceError`] variants.
    enum EdgeSourceErrorCode for EdgeSourceError {
        /// The source yielded no edges.
        EmptySource => EmptySource => "EDGE_SOURCE_EMPTY",
        /// An observation connected a node to itself.
        SelfLoop => SelfLoop { .. } => "EDGE_SOURCE_SELF_LOOP",
        /// Requested observation index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "EDGE_SOURCE_OUT_OF_BOUNDS",
    }
}

/// Error type produced by graph construction, feature building, scoring,
/// rewiring, metrics and the simulator.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LinkDriftError {
    /// An edge was requested between a node and itself.
    #[error("edges must join distinct nodes (got self-loop on {node})")]
    SelfLoop {
        /// Node named on both ends of the edge.
        node: NodeId,
    },
    /// An edge referenced a node outside the node universe.
    #[error("node {node} is not part of the node universe")]
    UnknownNode {
        /// The node missing from the universe.
        node: NodeId,
    },
    /// The partition does not label a node of the universe.
    #[error("node {node} has no community label in the partition")]
    UnpartitionedNode {
        /// The node missing from the partition.
        node: NodeId,
    },
    /// The graph has no edges to work with.
    #[error("graph has {nodes} nodes but no edges")]
    EmptyGraph {
        /// Number of nodes in the rejected graph.
        nodes: usize,
    },
    /// A classifier was asked to fit a table without rows.
    #[error("cannot fit a classifier on an empty pair table")]
    EmptyTable,
    /// The label column holds a single class.
    #[error("label column is constant: {positives} positives in {rows} rows")]
    DegenerateLabelSet {
        /// Number of rows labelled as edges.
        positives: usize,
        /// Total number of rows in the table.
        rows: usize,
    },
    /// Scores were requested from a classifier that has not been fitted.
    #[error("scorer has not been fitted")]
    NotFitted,
    /// A feature vector did not match the schema the scorer was trained on.
    #[error("feature vector has width {actual} but the scorer expects {expected}")]
    FeatureWidthMismatch {
        /// Width the scorer was trained with.
        expected: usize,
        /// Width of the offending vector.
        actual: usize,
    },
    /// Scorer configuration is outside its valid range.
    #[error("invalid scorer configuration: {reason}")]
    InvalidScorerConfig {
        /// Description of the rejected parameter.
        reason: &'static str,
    },
    /// Rewiring needs more candidates than exist.
    #[error("{stage} needs {requested} candidates but only {available} are available")]
    InsufficientCandidates {
        /// Rewiring stage that ran short.
        stage: RewireStage,
        /// Number of candidates requested.
        requested: usize,
        /// Number of candidates available.
        available: usize,
    },
    /// The candidate table was built over a different node universe.
    #[error("candidate table covers {table_nodes} nodes but the graph has {graph_nodes}")]
    CandidateTableMismatch {
        /// Nodes covered by the candidate table.
        table_nodes: usize,
        /// Nodes in the graph being rewired.
        graph_nodes: usize,
    },
    /// A metric is undefined for the supplied input.
    #[error("{metric} is undefined: {reason}")]
    UndefinedMetric {
        /// Metric that could not be computed.
        metric: MetricKind,
        /// Why the metric is undefined.
        reason: &'static str,
    },
    /// Paired inputs had different lengths.
    #[error("length mismatch: scores={scores}, labels={labels}")]
    LengthMismatch {
        /// Number of scores supplied.
        scores: usize,
        /// Number of labels supplied.
        labels: usize,
    },
    /// The removal count must be at least one.
    #[error("removal_count must be at least 1 (got {got})")]
    InvalidRemovalCount {
        /// The rejected removal count.
        got: usize,
    },
    /// The iteration count must be at least one.
    #[error("iterations must be at least 1 (got {got})")]
    InvalidIterations {
        /// The rejected iteration count.
        got: usize,
    },
    /// All configured iterations have already run.
    #[error("simulation finished after {iterations} iterations")]
    SimulationFinished {
        /// Number of iterations that completed.
        iterations: usize,
    },
    /// A previous iteration failed and the run cannot continue.
    #[error("simulation aborted during iteration {iteration}")]
    SimulationAborted {
        /// Iteration that failed.
        iteration: usize,
    },
    /// An [`crate::EdgeSource`] failed while loading edges.
    #[error("edge source `{edge_source}` failed: {error}")]
    EdgeSource {
        /// Identifier for the edge source that produced the error.
        edge_source: Arc<str>,
        #[source]
        /// Underlying edge source error.
        error: EdgeSourceError,
    },
}

define_error_codes! {
    /// Stable codes describing [`LinkDriftError`] variants.
    enum LinkDriftErrorCode for LinkDriftError {
        /// An edge was requested between a node and itself.
        SelfLoop => SelfLoop { .. } => "LINKDRIFT_SELF_LOOP",
        /// An edge referenced a node outside the node universe.
        UnknownNode => UnknownNode { .. } => "LINKDRIFT_UNKNOWN_NODE",
        /// The partition does not label a node of the universe.
        UnpartitionedNode => UnpartitionedNode { .. } => "LINKDRIFT_UNPARTITIONED_NODE",
        /// The graph has no edges to work with.
        EmptyGraph => EmptyGraph { .. } => "LINKDRIFT_EMPTY_GRAPH",
        /// A classifier was asked to fit a table without rows.
        EmptyTable => EmptyTable => "LINKDRIFT_EMPTY_TABLE",
        /// The label column holds a single class.
        DegenerateLabelSet => DegenerateLabelSet { .. } => "LINKDRIFT_DEGENERATE_LABEL_SET",
        /// Scores were requested from a classifier that has not been fitted.
        NotFitted => NotFitted => "LINKDRIFT_NOT_FITTED",
        /// A feature vector did not match the trained schema.
        FeatureWidthMismatch => FeatureWidthMismatch { .. } => "LINKDRIFT_FEATURE_WIDTH_MISMATCH",
        /// Scorer configuration is outside its valid range.
        InvalidScorerConfig => InvalidScorerConfig { .. } => "LINKDRIFT_INVALID_SCORER_CONFIG",
        /// Rewiring needs more candidates than exist.
        InsufficientCandidates => InsufficientCandidates { .. } => "LINKDRIFT_INSUFFICIENT_CANDIDATES",
        /// The candidate table was built over a different node universe.
        CandidateTableMismatch => CandidateTableMismatch { .. } => "LINKDRIFT_CANDIDATE_TABLE_MISMATCH",
        /// A metric is undefined for the supplied input.
        UndefinedMetric => UndefinedMetric { .. } => "LINKDRIFT_UNDEFINED_METRIC",
        /// Paired inputs had different lengths.
        LengthMismatch => LengthMismatch { .. } => "LINKDRIFT_LENGTH_MISMATCH",
        /// The removal count must be at least one.
        InvalidRemovalCount => InvalidRemovalCount { .. } => "LINKDRIFT_INVALID_REMOVAL_COUNT",
        /// The iteration count must be at least one.
        InvalidIterations => InvalidIterations { .. } => "LINKDRIFT_INVALID_ITERATIONS",
        /// All configured iterations have already run.
        SimulationFinished => SimulationFinished { .. } => "LINKDRIFT_SIMULATION_FINISHED",
        /// A previous iteration failed and the run cannot continue.
        SimulationAborted => SimulationAborted { .. } => "LINKDRIFT_SIMULATION_ABORTED",
        /// An edge source failed while loading edges.
        EdgeSourceFailure => EdgeSource { .. } => "LINKDRIFT_EDGE_SOURCE_FAILURE",
    }
}

impl LinkDriftError {
    /// Retrieve the inner [`EdgeSourceErrorCode`] when the error originated in an [`crate::EdgeSource`].
    pub const fn edge_source_code(&self) -> Option<EdgeSourceErrorCode> {
        match self {
            Self::EdgeSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, LinkDriftError>;
