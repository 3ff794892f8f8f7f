//! Immutable graph snapshots.
//!
//! A [`Graph`] is a simple undirected graph: a node universe plus a set of
//! normalised [`Edge`]s. Nodes may have no incident edges; they stay in the
//! snapshot so rewiring never drops isolated nodes. Degree, neighbour,
//! component and PageRank queries are derived on demand.

mod components;
mod edge;
mod pagerank;

use std::collections::{BTreeMap, BTreeSet};

pub use self::edge::{Edge, NodeId};
pub use self::pagerank::{PageRank, PageRankConfig};

use crate::error::Result;

/// Node and edge sets valid at one point of a simulation.
///
/// # Examples
/// ```
/// use linkdrift_core::{Graph, NodeId};
///
/// let graph = Graph::try_from_pairs(&[(0, 1), (1, 2), (2, 0), (1, 0)])?;
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// assert_eq!(graph.degree(NodeId::new(1)), 2);
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeSet<NodeId>,
    edges: BTreeSet<Edge>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Graph {
    /// Builds a graph whose nodes are exactly the endpoints of `edges`.
    ///
    /// Duplicate edges collapse to one.
    #[must_use]
    pub fn from_edges<E>(edges: E) -> Self
    where
        E: IntoIterator<Item = Edge>,
    {
        Self::with_nodes(std::iter::empty(), edges)
    }

    /// Builds a graph over `nodes` plus every endpoint of `edges`.
    ///
    /// Nodes without incident edges are kept as isolated nodes.
    ///
    /// # Examples
    /// ```
    /// use linkdrift_core::{Edge, Graph, NodeId};
    ///
    /// let graph = Graph::with_nodes(
    ///     [NodeId::new(9)],
    ///     [Edge::from_raw(0, 1)?],
    /// );
    /// assert_eq!(graph.node_count(), 3);
    /// assert_eq!(graph.degree(NodeId::new(9)), 0);
    /// # Ok::<(), linkdrift_core::LinkDriftError>(())
    /// ```
    #[must_use]
    pub fn with_nodes<N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = NodeId>,
        E: IntoIterator<Item = Edge>,
    {
        let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> =
            nodes.into_iter().map(|node| (node, BTreeSet::new())).collect();
        let mut edge_set = BTreeSet::new();
        for edge in edges {
            if !edge_set.insert(edge) {
                continue;
            }
            adjacency
                .entry(edge.source())
                .or_default()
                .insert(edge.target());
            adjacency
                .entry(edge.target())
                .or_default()
                .insert(edge.source());
        }
        let nodes = adjacency.keys().copied().collect();
        Self {
            nodes,
            edges: edge_set,
            adjacency,
        }
    }

    /// Builds a graph from raw identifier pairs.
    ///
    /// # Errors
    /// Returns [`crate::LinkDriftError::SelfLoop`] when a pair repeats a node.
    pub fn try_from_pairs(pairs: &[(u64, u64)]) -> Result<Self> {
        let edges = pairs
            .iter()
            .map(|&(left, right)| Edge::from_raw(left, right))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_edges(edges))
    }

    /// Returns the number of nodes, isolated ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the node universe in ascending order.
    #[must_use]
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Returns the edge set in ascending order.
    #[must_use]
    pub fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    /// Returns `true` when `node` belongs to the snapshot.
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns `true` when `edge` is present.
    #[must_use]
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Returns the degree of `node`, or zero when it is not in the snapshot.
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }

    /// Returns the degree of every node in ascending node order.
    #[must_use]
    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency.values().map(BTreeSet::len).collect()
    }

    /// Iterates over the neighbours of `node` in ascending order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|neighbors| neighbors.iter().copied())
    }

    /// Counts the neighbours shared by `left` and `right`.
    ///
    /// # Examples
    /// ```
    /// use linkdrift_core::{Graph, NodeId};
    ///
    /// let graph = Graph::try_from_pairs(&[(0, 2), (1, 2), (0, 3), (1, 3)])?;
    /// assert_eq!(graph.common_neighbors(NodeId::new(0), NodeId::new(1)), 2);
    /// # Ok::<(), linkdrift_core::LinkDriftError>(())
    /// ```
    #[must_use]
    pub fn common_neighbors(&self, left: NodeId, right: NodeId) -> usize {
        match (self.adjacency.get(&left), self.adjacency.get(&right)) {
            (Some(a), Some(b)) => a.intersection(b).count(),
            _ => 0,
        }
    }

    /// Iterates over nodes without incident edges.
    pub fn isolated_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .iter()
            .filter(|(_, neighbors)| neighbors.is_empty())
            .map(|(node, _)| *node)
    }

    /// Returns the number of unordered node pairs not joined by an edge.
    #[must_use]
    pub fn non_edge_count(&self) -> usize {
        pair_count(self.node_count()).saturating_sub(self.edge_count())
    }

    /// Maps each node to its dense index in ascending node order.
    pub(crate) fn index_map(&self) -> BTreeMap<NodeId, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (*node, index))
            .collect()
    }
}

/// Returns `n choose 2`, the number of unordered pairs over `n` nodes.
#[must_use]
pub const fn pair_count(nodes: usize) -> usize {
    nodes.saturating_mul(nodes.saturating_sub(1)) / 2
}
