//! Hold-out evaluation of a scorer against later observations.

use std::collections::BTreeSet;

use tracing::{info, instrument};

use crate::{
    Result,
    features::{FeatureBuilder, FeatureInputs},
    graph::{Edge, Graph},
    metrics::roc_auc,
    partition::Partition,
    scorer::Scorer,
};

/// Outcome of [`evaluate_holdout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldoutReport {
    /// ROC-AUC of the scores against the test labels.
    pub auc: f64,
    /// Rows in the training (and evaluation) table.
    pub training_rows: usize,
    /// Share of training rows that were training edges.
    pub training_positive_rate: f64,
    /// Share of evaluation rows that were test edges.
    pub test_positive_rate: f64,
    /// Test edges dropped for touching nodes unseen in training.
    pub dropped_test_edges: usize,
}

/// Trains `scorer` on `training` and scores every pair of the training
/// universe against `test`.
///
/// Features for both tables are computed on the training graph under one
/// partition: `partition` when supplied, otherwise one detected by
/// `builder` on the training graph.
///
/// # Errors
/// Propagates feature, scorer and metric failures, notably
/// [`crate::LinkDriftError::UndefinedMetric`] when no test edge survives.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use linkdrift_core::{Edge, FeatureBuilder, LogisticRegression, evaluate_holdout};
///
/// let edges = |pairs: &[(u64, u64)]| -> Result<BTreeSet<Edge>, _> {
///     pairs.iter().map(|&(a, b)| Edge::from_raw(a, b)).collect()
/// };
/// let training = edges(&[(0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (4, 5), (3, 5)])?;
/// let test = edges(&[(0, 1), (4, 5), (5, 9)])?;
/// let mut scorer = LogisticRegression::default();
/// let report = evaluate_holdout(&training, &test, &FeatureBuilder::new(), None, &mut scorer)?;
/// assert_eq!(report.dropped_test_edges, 1);
/// assert_eq!(report.training_rows, 15);
/// assert!((0.0..=1.0).contains(&report.auc));
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[instrument(
    name = "holdout.evaluate",
    err,
    skip_all,
    fields(training_edges = training.len(), test_edges = test.len()),
)]
pub fn evaluate_holdout<S: Scorer + ?Sized>(
    training: &BTreeSet<Edge>,
    test: &BTreeSet<Edge>,
    builder: &FeatureBuilder,
    partition: Option<&Partition>,
    scorer: &mut S,
) -> Result<HoldoutReport> {
    let graph = Graph::from_edges(training.iter().copied());
    let detected;
    let partition = match partition {
        Some(partition) => partition,
        None => {
            detected = builder.detect_partition(&graph);
            &detected
        }
    };

    let training_table = builder.build_with(
        FeatureInputs::new(graph.edges())
            .with_universe(graph.nodes())
            .with_reference(&graph)
            .with_partition(partition),
    )?;
    scorer.fit(&training_table)?;

    let kept: BTreeSet<Edge> = test
        .iter()
        .copied()
        .filter(|edge| graph.contains_node(edge.source()) && graph.contains_node(edge.target()))
        .collect();
    let dropped_test_edges = test.len() - kept.len();
    let evaluation_table = builder.build_with(
        FeatureInputs::new(&kept)
            .with_universe(graph.nodes())
            .with_reference(&graph)
            .with_partition(partition),
    )?;

    let scores = scorer.score_table(&evaluation_table)?;
    let auc = roc_auc(&scores, &evaluation_table.labels())?;
    info!(auc, dropped_test_edges, "hold-out evaluation completed");
    Ok(HoldoutReport {
        auc,
        training_rows: training_table.len(),
        training_positive_rate: training_table.positive_rate(),
        test_positive_rate: evaluation_table.positive_rate(),
        dropped_test_edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinkDriftError, LogisticRegression, MetricKind, NodeId};
    use linkdrift_test_support::fixtures;

    fn edges(pairs: &[(u64, u64)]) -> BTreeSet<Edge> {
        pairs
            .iter()
            .map(|&(a, b)| Edge::from_raw(a, b).expect("fixture pairs are valid"))
            .collect()
    }

    #[test]
    fn repeated_contacts_are_ranked_above_chance() {
        // Test edges repeat the dense cliques; the absent pairs are mostly
        // cross-clique, which the community features separate.
        let training = edges(&fixtures::two_cliques(5));
        let test = edges(&[(0, 1), (1, 2), (5, 6), (6, 7), (7, 8)]);
        let mut scorer = LogisticRegression::default();
        let report = evaluate_holdout(&training, &test, &FeatureBuilder::new(), None, &mut scorer)
            .expect("evaluation");
        assert!(report.auc > 0.5, "auc {}", report.auc);
        assert_eq!(report.dropped_test_edges, 0);
        assert_eq!(report.training_rows, 45);
    }

    #[test]
    fn supplied_partition_is_used() {
        let training = edges(&fixtures::two_triangles());
        let test = edges(&[(0, 1)]);
        let partition = Partition::from_labels(
            (0..6).map(|id| (NodeId::new(id), 0)),
        );
        let mut scorer = LogisticRegression::default();
        let report = evaluate_holdout(
            &training,
            &test,
            &FeatureBuilder::new(),
            Some(&partition),
            &mut scorer,
        )
        .expect("evaluation");
        assert_eq!(report.training_rows, 15);
        assert!((report.test_positive_rate - 1.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn unseen_test_nodes_leave_auc_undefined() {
        let training = edges(&fixtures::two_triangles());
        let test = edges(&[(10, 11)]);
        let mut scorer = LogisticRegression::default();
        let err = evaluate_holdout(&training, &test, &FeatureBuilder::new(), None, &mut scorer)
            .expect_err("no test edge survives");
        assert!(matches!(
            err,
            LinkDriftError::UndefinedMetric {
                metric: MetricKind::RocAuc,
                ..
            }
        ));
    }
}
