//! Community partitions.
//!
//! A [`Partition`] assigns every node of a universe to a [`CommunityId`].
//! Labels are compacted to `0..k` in order of first appearance over ascending
//! node ids, so the label count is known up front and two partitions with
//! the same grouping compare equal regardless of the raw labels used to
//! build them.

mod louvain;

use std::collections::{BTreeMap, BTreeSet};

pub use self::louvain::LouvainConfig;

use crate::{
    error::{LinkDriftError, Result},
    graph::{Graph, NodeId},
};

/// Identifier assigned to a community.
///
/// # Examples
/// ```
/// use linkdrift_core::CommunityId;
///
/// let id = CommunityId::new(3);
/// assert_eq!(id.get(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommunityId(usize);

impl CommunityId {
    /// Creates a new community identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: usize) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> usize { self.0 }
}

/// Fixed assignment of nodes to communities.
///
/// # Examples
/// ```
/// use linkdrift_core::{CommunityId, NodeId, Partition};
///
/// let partition = Partition::from_labels([
///     (NodeId::new(4), "b"),
///     (NodeId::new(1), "a"),
///     (NodeId::new(2), "b"),
/// ]);
/// assert_eq!(partition.community_count(), 2);
/// assert_eq!(partition.community_of(NodeId::new(1)), Some(CommunityId::new(0)));
/// assert_eq!(partition.community_of(NodeId::new(4)), Some(CommunityId::new(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    labels: BTreeMap<NodeId, CommunityId>,
    community_count: usize,
}

impl Partition {
    /// Builds a partition from arbitrary per-node labels.
    ///
    /// Later entries for the same node replace earlier ones. Labels are
    /// compacted to `0..k`.
    #[must_use]
    pub fn from_labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, L)>,
        L: Ord,
    {
        let raw: BTreeMap<NodeId, L> = labels.into_iter().collect();
        let mut compacted: BTreeMap<&L, CommunityId> = BTreeMap::new();
        let mut assigned = BTreeMap::new();
        for (node, label) in &raw {
            let next = CommunityId::new(compacted.len());
            let id = *compacted.entry(label).or_insert(next);
            assigned.insert(*node, id);
        }
        Self {
            community_count: compacted.len(),
            labels: assigned,
        }
    }

    /// Places every node of `graph` in its own community.
    #[must_use]
    pub fn singletons(graph: &Graph) -> Self {
        Self::from_labels(graph.nodes().iter().map(|node| (*node, node.get())))
    }

    /// Detects communities in `graph` with the Louvain method.
    ///
    /// The node visiting order is shuffled with a generator seeded from
    /// `config`, so the same graph and seed always yield the same partition.
    ///
    /// # Examples
    /// ```
    /// use linkdrift_core::{Graph, LouvainConfig, NodeId, Partition};
    ///
    /// let graph = Graph::try_from_pairs(&[
    ///     (0, 1), (1, 2), (2, 0),
    ///     (3, 4), (4, 5), (5, 3),
    ///     (2, 3),
    /// ])?;
    /// let partition = Partition::detect(&graph, &LouvainConfig::default());
    /// assert_eq!(partition.community_count(), 2);
    /// assert_eq!(
    ///     partition.community_of(NodeId::new(0)),
    ///     partition.community_of(NodeId::new(2)),
    /// );
    /// # Ok::<(), linkdrift_core::LinkDriftError>(())
    /// ```
    #[must_use]
    pub fn detect(graph: &Graph, config: &LouvainConfig) -> Self {
        louvain::detect(graph, config)
    }

    /// Returns the community of `node`, if labelled.
    #[must_use]
    pub fn community_of(&self, node: NodeId) -> Option<CommunityId> {
        self.labels.get(&node).copied()
    }

    /// Returns the community of `node`.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::UnpartitionedNode`] when `node` has no label.
    pub fn require(&self, node: NodeId) -> Result<CommunityId> {
        self.community_of(node)
            .ok_or(LinkDriftError::UnpartitionedNode { node })
    }

    /// Checks that every node in `nodes` carries a label.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::UnpartitionedNode`] for the first unlabelled node.
    pub fn ensure_covers(&self, nodes: &BTreeSet<NodeId>) -> Result<()> {
        nodes
            .iter()
            .try_for_each(|node| self.require(*node).map(|_| ()))
    }

    /// Returns the number of distinct communities.
    #[must_use]
    pub fn community_count(&self) -> usize {
        self.community_count
    }

    /// Returns the number of labelled nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns whether no node is labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over `(node, community)` pairs in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, CommunityId)> + '_ {
        self.labels.iter().map(|(node, id)| (*node, *id))
    }

    /// Lists the members of each community, indexed by community id.
    #[must_use]
    pub fn communities(&self) -> Vec<Vec<NodeId>> {
        let mut members = vec![Vec::new(); self.community_count];
        for (node, id) in self.iter() {
            if let Some(slot) = members.get_mut(id.get()) {
                slot.push(node);
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkdrift_test_support::fixtures;
    use rstest::rstest;

    fn graph_from(pairs: &[(u64, u64)]) -> Graph {
        Graph::try_from_pairs(pairs).expect("fixture pairs are valid")
    }

    #[test]
    fn labels_are_compacted_in_node_order() {
        let partition = Partition::from_labels([
            (NodeId::new(3), 70),
            (NodeId::new(1), 90),
            (NodeId::new(2), 70),
        ]);
        let labels: Vec<usize> = partition.iter().map(|(_, id)| id.get()).collect();
        assert_eq!(labels, vec![0, 1, 1]);
        assert_eq!(partition.community_count(), 2);
    }

    #[test]
    fn require_reports_missing_nodes() {
        let partition = Partition::from_labels([(NodeId::new(0), 0)]);
        let err = partition
            .require(NodeId::new(5))
            .expect_err("node 5 is unlabelled");
        assert_eq!(err, LinkDriftError::UnpartitionedNode { node: NodeId::new(5) });
    }

    #[test]
    fn communities_group_members() {
        let partition = Partition::from_labels([
            (NodeId::new(0), 'x'),
            (NodeId::new(1), 'y'),
            (NodeId::new(2), 'x'),
        ]);
        assert_eq!(
            partition.communities(),
            vec![
                vec![NodeId::new(0), NodeId::new(2)],
                vec![NodeId::new(1)],
            ]
        );
    }

    #[rstest]
    #[case::triangles(fixtures::two_triangles())]
    #[case::cliques(fixtures::two_cliques(5))]
    fn detect_separates_bridged_groups(#[case] pairs: Vec<(u64, u64)>) {
        let graph = graph_from(&pairs);
        let partition = Partition::detect(&graph, &LouvainConfig::default());
        assert_eq!(partition.community_count(), 2);
        assert_eq!(partition.len(), graph.node_count());
    }

    #[test]
    fn detect_is_deterministic_for_a_seed() {
        let graph = graph_from(&fixtures::ring(12));
        let config = LouvainConfig::default().with_seed(17);
        assert_eq!(
            Partition::detect(&graph, &config),
            Partition::detect(&graph, &config)
        );
    }

    #[test]
    fn detect_without_edges_yields_singletons() {
        let graph = Graph::with_nodes([NodeId::new(1), NodeId::new(2)], std::iter::empty());
        let partition = Partition::detect(&graph, &LouvainConfig::default());
        assert_eq!(partition, Partition::singletons(&graph));
        assert_eq!(partition.community_count(), 2);
    }

    #[test]
    fn detect_labels_isolated_nodes() {
        let edges = fixtures::two_triangles()
            .into_iter()
            .map(|(a, b)| crate::Edge::from_raw(a, b).expect("edge"));
        let graph = Graph::with_nodes([NodeId::new(99)], edges);
        let partition = Partition::detect(&graph, &LouvainConfig::default());
        assert!(partition.community_of(NodeId::new(99)).is_some());
        assert_eq!(partition.community_count(), 3);
    }
}
