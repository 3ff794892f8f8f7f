//! Connected-component queries backed by a disjoint-set forest.

use std::collections::BTreeMap;

use super::{Graph, NodeId};

#[derive(Clone, Debug)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    fn union(&mut self, left: usize, right: usize) {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
    }
}

impl Graph {
    /// Groups nodes into connected components.
    ///
    /// Each component lists its nodes in ascending order; components are
    /// ordered by their smallest node. Isolated nodes form singleton
    /// components.
    ///
    /// # Examples
    /// ```
    /// use linkdrift_core::{Edge, Graph, NodeId};
    ///
    /// let graph = Graph::with_nodes([NodeId::new(5)], [Edge::from_raw(0, 1)?]);
    /// let components = graph.connected_components();
    /// assert_eq!(components.len(), 2);
    /// assert_eq!(components[1], vec![NodeId::new(5)]);
    /// # Ok::<(), linkdrift_core::LinkDriftError>(())
    /// ```
    #[must_use]
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let index = self.index_map();
        let mut forest = DisjointSet::new(index.len());
        for edge in self.edges() {
            if let (Some(&left), Some(&right)) = (index.get(&edge.source()), index.get(&edge.target()))
            {
                forest.union(left, right);
            }
        }

        let mut by_root: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        for (node, &position) in &index {
            by_root.entry(forest.find(position)).or_default().push(*node);
        }
        let mut components: Vec<Vec<NodeId>> = by_root.into_values().collect();
        components.sort_by_key(|component| component.first().copied());
        components
    }

    /// Returns the number of connected components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.connected_components().len()
    }
}
