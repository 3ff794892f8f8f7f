//! Network-level measurements.
//!
//! [`modularity`] and [`degree_inequality`] describe a snapshot;
//! [`roc_auc`] measures how well scores separate positive from negative
//! labels. Each returns [`LinkDriftError::UndefinedMetric`] instead of a
//! non-finite value when its inputs leave it undefined.

use std::{collections::BTreeMap, fmt};

use crate::{
    error::{LinkDriftError, Result},
    graph::Graph,
    partition::{CommunityId, Partition},
};

/// Metric named by [`LinkDriftError::UndefinedMetric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MetricKind {
    /// Newman modularity of a partition.
    Modularity,
    /// Gini coefficient of the degree sequence.
    DegreeInequality,
    /// Area under the ROC curve.
    RocAuc,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Modularity => "modularity",
            Self::DegreeInequality => "degree inequality",
            Self::RocAuc => "ROC-AUC",
        })
    }
}

/// Newman modularity of `partition` over `graph`.
///
/// `Q = Σ_c [ L_c / m − (d_c / 2m)² ]`, where `m` is the edge count, `L_c` the
/// edges inside community `c` and `d_c` the degree sum of its members.
///
/// # Errors
/// Returns [`LinkDriftError::UndefinedMetric`] for an edgeless graph and
/// [`LinkDriftError::UnpartitionedNode`] when `partition` misses a node.
///
/// # Examples
/// ```
/// use linkdrift_core::{Graph, NodeId, Partition, modularity};
///
/// let graph = Graph::try_from_pairs(&[(0, 1), (2, 3)])?;
/// let partition = Partition::from_labels([
///     (NodeId::new(0), 0), (NodeId::new(1), 0),
///     (NodeId::new(2), 1), (NodeId::new(3), 1),
/// ]);
/// assert!((modularity(&graph, &partition)? - 0.5).abs() < 1e-12);
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
pub fn modularity(graph: &Graph, partition: &Partition) -> Result<f64> {
    let m = graph.edge_count();
    if m == 0 {
        return Err(LinkDriftError::UndefinedMetric {
            metric: MetricKind::Modularity,
            reason: "graph has no edges",
        });
    }
    partition.ensure_covers(graph.nodes())?;

    let mut internal: BTreeMap<CommunityId, usize> = BTreeMap::new();
    let mut degree_sums: BTreeMap<CommunityId, usize> = BTreeMap::new();
    for &node in graph.nodes() {
        let community = partition.require(node)?;
        *degree_sums.entry(community).or_default() += graph.degree(node);
    }
    for edge in graph.edges() {
        let source = partition.require(edge.source())?;
        if source == partition.require(edge.target())? {
            *internal.entry(source).or_default() += 1;
        }
    }

    let m = m as f64;
    Ok(degree_sums
        .iter()
        .map(|(community, &degree_sum)| {
            let links = internal.get(community).copied().unwrap_or(0) as f64;
            let share = degree_sum as f64 / (2.0 * m);
            links / m - share * share
        })
        .sum())
}

/// Gini coefficient of the degree sequence, in `[0, 1)`.
///
/// Computed as `Σ_i (2i − n + 1)·d_i / (n · Σ d)` over degrees sorted
/// ascending, which equals the mean absolute pairwise difference over twice
/// the mean degree. Isolated nodes count with degree zero.
///
/// # Errors
/// Returns [`LinkDriftError::UndefinedMetric`] when the mean degree is zero.
///
/// # Examples
/// ```
/// use linkdrift_core::{Graph, degree_inequality};
///
/// let ring = Graph::try_from_pairs(&[(0, 1), (1, 2), (2, 3), (3, 0)])?;
/// assert_eq!(degree_inequality(&ring)?, 0.0);
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
pub fn degree_inequality(graph: &Graph) -> Result<f64> {
    let mut degrees = graph.degrees();
    let total: usize = degrees.iter().sum();
    if total == 0 {
        return Err(LinkDriftError::UndefinedMetric {
            metric: MetricKind::DegreeInequality,
            reason: "mean degree is zero",
        });
    }
    degrees.sort_unstable();
    let n = degrees.len() as f64;
    let weighted: f64 = degrees
        .iter()
        .enumerate()
        .map(|(i, &degree)| (2.0 * i as f64 - n + 1.0) * degree as f64)
        .sum();
    Ok(weighted / (n * total as f64))
}

/// Area under the ROC curve of `scores` against `labels`.
///
/// Equals the probability that a random positive outscores a random
/// negative; tied scores count one half.
///
/// # Errors
/// Returns [`LinkDriftError::LengthMismatch`] when the slices differ in
/// length and [`LinkDriftError::UndefinedMetric`] when either class is
/// absent.
///
/// # Examples
/// ```
/// use linkdrift_core::roc_auc;
///
/// let auc = roc_auc(&[0.9, 0.8, 0.3, 0.1], &[true, false, true, false])?;
/// assert!((auc - 0.75).abs() < 1e-12);
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> Result<f64> {
    if scores.len() != labels.len() {
        return Err(LinkDriftError::LengthMismatch {
            scores: scores.len(),
            labels: labels.len(),
        });
    }
    let positives = labels.iter().filter(|label| **label).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(LinkDriftError::UndefinedMetric {
            metric: MetricKind::RocAuc,
            reason: "labels contain a single class",
        });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Mann-Whitney U with tied scores sharing their average rank.
    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]].total_cmp(&scores[order[start]]).is_eq() {
            end += 1;
        }
        let average_rank = (start + end + 1) as f64 / 2.0;
        let tied_positives = order[start..end]
            .iter()
            .filter(|&&index| labels[index])
            .count();
        positive_rank_sum += average_rank * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    let u = positive_rank_sum - p * (p + 1.0) / 2.0;
    Ok(u / (p * negatives as f64))
}

/// Structural summary of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotMetrics {
    /// Modularity under the fixed partition.
    pub modularity: f64,
    /// Gini coefficient of the degree sequence.
    pub degree_inequality: f64,
    /// Connected components, isolated nodes included.
    pub components: usize,
}

impl SnapshotMetrics {
    /// Measures `graph` under `partition`.
    ///
    /// # Errors
    /// Propagates failures from [`modularity`] and [`degree_inequality`].
    pub fn measure(graph: &Graph, partition: &Partition) -> Result<Self> {
        Ok(Self {
            modularity: modularity(graph, partition)?,
            degree_inequality: degree_inequality(graph)?,
            components: graph.component_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, LouvainConfig, NodeId};
    use linkdrift_test_support::fixtures;
    use rstest::rstest;

    fn graph_from(pairs: &[(u64, u64)]) -> Graph {
        Graph::try_from_pairs(pairs).expect("fixture pairs are valid")
    }

    fn close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn modularity_of_two_triangles() {
        let graph = graph_from(&fixtures::two_triangles());
        let partition = Partition::detect(&graph, &LouvainConfig::default());
        // Two communities of three intra-edges each plus one bridge: m = 7,
        // each community has degree sum 7.
        close(modularity(&graph, &partition).expect("defined"), 6.0 / 7.0 - 0.5);
    }

    #[test]
    fn single_community_has_zero_modularity() {
        let graph = graph_from(&fixtures::ring(6));
        let partition = Partition::from_labels(graph.nodes().iter().map(|n| (*n, 0)));
        close(modularity(&graph, &partition).expect("defined"), 0.0);
    }

    #[test]
    fn modularity_is_undefined_without_edges() {
        let graph = Graph::with_nodes([NodeId::new(0)], std::iter::empty::<Edge>());
        let partition = Partition::singletons(&graph);
        assert_eq!(
            modularity(&graph, &partition),
            Err(LinkDriftError::UndefinedMetric {
                metric: MetricKind::Modularity,
                reason: "graph has no edges",
            })
        );
    }

    #[test]
    fn modularity_requires_full_partition() {
        let graph = graph_from(&[(0, 1), (1, 2)]);
        let partition = Partition::from_labels([(NodeId::new(0), 0), (NodeId::new(1), 0)]);
        assert_eq!(
            modularity(&graph, &partition),
            Err(LinkDriftError::UnpartitionedNode { node: NodeId::new(2) })
        );
    }

    #[rstest]
    #[case::ring(fixtures::ring(8))]
    #[case::complete(fixtures::complete(5))]
    fn regular_graphs_have_zero_inequality(#[case] pairs: Vec<(u64, u64)>) {
        close(degree_inequality(&graph_from(&pairs)).expect("defined"), 0.0);
    }

    #[test]
    fn star_inequality_matches_closed_form() {
        // Degrees [1, 1, 1, 1, 4]: Σ (2i − 4)·d_i = 4·4 + (−4 −2 + 0 + 2) = 12,
        // n·Σd = 5·8 = 40.
        let graph = graph_from(&[(0, 1), (0, 2), (0, 3), (0, 4)]);
        close(degree_inequality(&graph).expect("defined"), 12.0 / 40.0);
    }

    #[test]
    fn isolated_nodes_raise_inequality() {
        let edge = Edge::from_raw(0, 1).expect("edge");
        let dense = Graph::from_edges([edge]);
        let sparse = Graph::with_nodes([NodeId::new(5), NodeId::new(6)], [edge]);
        let dense_gini = degree_inequality(&dense).expect("defined");
        let sparse_gini = degree_inequality(&sparse).expect("defined");
        assert!(sparse_gini > dense_gini);
    }

    #[test]
    fn inequality_is_undefined_for_edgeless_graph() {
        let graph = Graph::with_nodes([NodeId::new(0), NodeId::new(1)], std::iter::empty());
        assert!(matches!(
            degree_inequality(&graph),
            Err(LinkDriftError::UndefinedMetric {
                metric: MetricKind::DegreeInequality,
                ..
            })
        ));
    }

    #[rstest]
    #[case::perfect(&[0.9, 0.8, 0.2, 0.1], &[true, true, false, false], 1.0)]
    #[case::inverted(&[0.1, 0.2, 0.8, 0.9], &[true, true, false, false], 0.0)]
    #[case::all_tied(&[0.5, 0.5, 0.5, 0.5], &[true, false, true, false], 0.5)]
    #[case::partial_tie(&[0.7, 0.7, 0.1], &[true, false, false], 0.75)]
    fn roc_auc_matches_pairwise_counting(
        #[case] scores: &[f64],
        #[case] labels: &[bool],
        #[case] expected: f64,
    ) {
        close(roc_auc(scores, labels).expect("defined"), expected);
    }

    #[test]
    fn roc_auc_rejects_single_class() {
        assert!(matches!(
            roc_auc(&[0.1, 0.2], &[true, true]),
            Err(LinkDriftError::UndefinedMetric {
                metric: MetricKind::RocAuc,
                ..
            })
        ));
    }

    #[test]
    fn roc_auc_rejects_length_mismatch() {
        assert_eq!(
            roc_auc(&[0.1, 0.2, 0.3], &[true, false]),
            Err(LinkDriftError::LengthMismatch { scores: 3, labels: 2 })
        );
    }

    #[test]
    fn snapshot_metrics_count_components() {
        let graph = Graph::with_nodes(
            [NodeId::new(9)],
            [Edge::from_raw(0, 1).expect("edge"), Edge::from_raw(2, 3).expect("edge")],
        );
        let partition = Partition::singletons(&graph);
        let measured = SnapshotMetrics::measure(&graph, &partition).expect("defined");
        assert_eq!(measured.components, 3);
        close(
            measured.modularity,
            modularity(&graph, &partition).expect("defined"),
        );
    }

    #[test]
    fn metric_names_render() {
        assert_eq!(MetricKind::RocAuc.to_string(), "ROC-AUC");
        assert_eq!(MetricKind::DegreeInequality.to_string(), "degree inequality");
    }
}
