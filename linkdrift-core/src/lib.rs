//! LinkDrift core library.
//!
//! Simulates how repeatedly adding the links a model finds most likely
//! reshapes a social network. Each iteration builds a pairwise
//! [`PairTable`] from the current [`Graph`], trains a [`Scorer`], removes a
//! few random edges, adds the best-scoring non-edges, and records the
//! [`modularity`] and [`degree_inequality`] of the result against a fixed
//! [`Partition`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod edge_source;
mod error;
mod features;
mod graph;
mod holdout;
mod metrics;
mod partition;
mod report;
mod rewire;
mod scorer;
mod simulator;

#[cfg(test)]
mod properties;
#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    builder::SimulatorBuilder,
    edge_source::{EdgeSource, load_graph},
    error::{EdgeSourceError, EdgeSourceErrorCode, LinkDriftError, LinkDriftErrorCode, Result},
    features::{
        FeatureBuilder, FeatureInputs, FeatureSchema, NUMERIC_COLUMNS, PairFeatures, PairRow,
        PairTable,
    },
    graph::{Edge, Graph, NodeId, PageRank, PageRankConfig, pair_count},
    holdout::{HoldoutReport, evaluate_holdout},
    metrics::{MetricKind, SnapshotMetrics, degree_inequality, modularity, roc_auc},
    partition::{CommunityId, LouvainConfig, Partition},
    report::{IterationReport, SimulationReport},
    rewire::{Removal, RewireOutcome, RewireStage, Rewirer, ScoredPair, rank_candidates},
    scorer::{LogisticConfig, LogisticRegression, Scorer},
    simulator::{LinkPredictionSimulator, SimulationState},
};
