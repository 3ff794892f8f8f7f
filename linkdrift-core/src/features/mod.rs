//! Pairwise feature-and-label tables.
//!
//! [`FeatureBuilder`] enumerates every unordered pair of a node universe,
//! labels it with whether the pair is an observed edge, and attaches
//! structural features taken from a reference graph: endpoint degrees,
//! endpoint PageRank, endpoint communities and the common-neighbour count.
//!
//! The column layout is a [`FeatureSchema`] fixed by the partition's
//! community count: five numeric columns followed by a dense `k × k` block of
//! community-pair indicators. Tables built against the same partition always
//! share their columns, so a scorer trained on one table can score another.

use std::collections::BTreeSet;

use tracing::{Span, field, info, instrument};

use crate::{
    error::{LinkDriftError, Result},
    graph::{Edge, Graph, NodeId, PageRankConfig, pair_count},
    partition::{CommunityId, LouvainConfig, Partition},
};

/// Names of the numeric columns preceding the community-pair block.
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "source_degree",
    "target_degree",
    "source_pagerank",
    "target_pagerank",
    "common_neighbors",
];

/// Column layout of a pair table.
///
/// # Examples
/// ```
/// use linkdrift_core::{CommunityId, FeatureSchema};
///
/// let schema = FeatureSchema::new(2);
/// assert_eq!(schema.width(), 9);
/// assert_eq!(schema.indicator_column(CommunityId::new(1), CommunityId::new(0)), 7);
/// assert_eq!(schema.column_names()[7], "community_1_0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    community_count: usize,
}

impl FeatureSchema {
    /// Creates the schema for `community_count` communities.
    #[must_use]
    pub const fn new(community_count: usize) -> Self {
        Self { community_count }
    }

    /// Creates the schema matching `partition`.
    #[must_use]
    pub fn for_partition(partition: &Partition) -> Self {
        Self::new(partition.community_count())
    }

    /// Returns the number of communities the indicator block covers.
    #[must_use]
    pub const fn community_count(&self) -> usize {
        self.community_count
    }

    /// Returns the total number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.community_count * self.community_count
    }

    /// Returns the column holding the indicator for a community pair.
    #[must_use]
    pub const fn indicator_column(&self, source: CommunityId, target: CommunityId) -> usize {
        NUMERIC_COLUMNS.len() + source.get() * self.community_count + target.get()
    }

    /// Returns every column name in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let k = self.community_count;
        let mut names: Vec<String> = NUMERIC_COLUMNS.iter().map(|name| (*name).to_owned()).collect();
        names.extend((0..k).flat_map(|s| (0..k).map(move |t| format!("community_{s}_{t}"))));
        names
    }
}

/// Structural features of one node pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairFeatures {
    /// Degree of the source node in the reference graph.
    pub source_degree: usize,
    /// Degree of the target node in the reference graph.
    pub target_degree: usize,
    /// PageRank of the source node in the reference graph.
    pub source_pagerank: f64,
    /// PageRank of the target node in the reference graph.
    pub target_pagerank: f64,
    /// Community of the source node.
    pub source_community: CommunityId,
    /// Community of the target node.
    pub target_community: CommunityId,
    /// Neighbours shared by both nodes in the reference graph.
    pub common_neighbors: usize,
}

impl PairFeatures {
    /// Encodes the features as a dense vector laid out by `schema`.
    ///
    /// Communities outside the schema's range leave the indicator block zero.
    #[must_use]
    pub fn encode(&self, schema: &FeatureSchema) -> Vec<f64> {
        let mut values = vec![
            self.source_degree as f64,
            self.target_degree as f64,
            self.source_pagerank,
            self.target_pagerank,
            self.common_neighbors as f64,
        ];
        values.resize(schema.width(), 0.0);
        let k = schema.community_count();
        if self.source_community.get() < k && self.target_community.get() < k {
            let column = schema.indicator_column(self.source_community, self.target_community);
            if let Some(slot) = values.get_mut(column) {
                *slot = 1.0;
            }
        }
        values
    }
}

/// One labelled node pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRow {
    pair: Edge,
    link: bool,
    features: PairFeatures,
}

impl PairRow {
    /// Returns the pair as a normalised edge.
    #[must_use]
    pub const fn pair(&self) -> Edge {
        self.pair
    }

    /// Returns the smaller node of the pair.
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.pair.source()
    }

    /// Returns the larger node of the pair.
    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.pair.target()
    }

    /// Returns whether the pair is an observed edge.
    #[must_use]
    pub const fn link(&self) -> bool {
        self.link
    }

    /// Returns the structural features of the pair.
    #[must_use]
    pub const fn features(&self) -> &PairFeatures {
        &self.features
    }
}

/// Complete pairwise table over a node universe.
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    schema: FeatureSchema,
    universe: BTreeSet<NodeId>,
    rows: Vec<PairRow>,
}

impl PairTable {
    /// Returns the column layout.
    #[must_use]
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Returns the node universe the table enumerates.
    #[must_use]
    pub const fn universe(&self) -> &BTreeSet<NodeId> {
        &self.universe
    }

    /// Returns the rows ordered by `(source, target)`.
    #[must_use]
    pub fn rows(&self) -> &[PairRow] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up the row for `pair`.
    #[must_use]
    pub fn row(&self, pair: &Edge) -> Option<&PairRow> {
        self.rows
            .binary_search_by(|row| row.pair.cmp(pair))
            .ok()
            .and_then(|index| self.rows.get(index))
    }

    /// Returns the number of rows labelled as edges.
    #[must_use]
    pub fn positives(&self) -> usize {
        self.rows.iter().filter(|row| row.link).count()
    }

    /// Returns the share of rows labelled as edges, or zero for an empty table.
    #[must_use]
    pub fn positive_rate(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.positives() as f64 / self.rows.len() as f64
    }

    /// Returns the label column.
    #[must_use]
    pub fn labels(&self) -> Vec<bool> {
        self.rows.iter().map(|row| row.link).collect()
    }

    /// Encodes every row with the table's schema.
    #[must_use]
    pub fn design_matrix(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.features.encode(&self.schema))
            .collect()
    }
}

/// Optional context for [`FeatureBuilder::build_with`].
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use linkdrift_core::{Edge, FeatureBuilder, FeatureInputs, NodeId};
///
/// let positives: BTreeSet<Edge> = [Edge::from_raw(0, 1)?].into_iter().collect();
/// let universe: BTreeSet<NodeId> = (0..4).map(NodeId::new).collect();
/// let table = FeatureBuilder::new()
///     .build_with(FeatureInputs::new(&positives).with_universe(&universe))?;
/// assert_eq!(table.len(), 6);
/// assert_eq!(table.positives(), 1);
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FeatureInputs<'a> {
    positives: &'a BTreeSet<Edge>,
    universe: Option<&'a BTreeSet<NodeId>>,
    reference: Option<&'a Graph>,
    partition: Option<&'a Partition>,
}

impl<'a> FeatureInputs<'a> {
    /// Starts from the positive (observed) edges.
    #[must_use]
    pub const fn new(positives: &'a BTreeSet<Edge>) -> Self {
        Self {
            positives,
            universe: None,
            reference: None,
            partition: None,
        }
    }

    /// Enumerates pairs over `universe` instead of the positive endpoints.
    #[must_use]
    pub const fn with_universe(mut self, universe: &'a BTreeSet<NodeId>) -> Self {
        self.universe = Some(universe);
        self
    }

    /// Computes structural features against `reference`.
    #[must_use]
    pub const fn with_reference(mut self, reference: &'a Graph) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Uses a fixed partition instead of detecting one.
    #[must_use]
    pub const fn with_partition(mut self, partition: &'a Partition) -> Self {
        self.partition = Some(partition);
        self
    }
}

/// Builds [`PairTable`]s.
///
/// # Examples
/// ```
/// use linkdrift_core::{FeatureBuilder, Graph};
///
/// let graph = Graph::try_from_pairs(&[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])?;
/// let table = FeatureBuilder::new().build(graph.edges())?;
/// assert_eq!(table.len(), 6);
/// assert!(table.rows().iter().all(|row| row.link()));
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureBuilder {
    pagerank: PageRankConfig,
    louvain: LouvainConfig,
}

impl FeatureBuilder {
    /// Creates a builder with default PageRank and Louvain settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the PageRank parameters.
    #[must_use]
    pub const fn with_pagerank(mut self, pagerank: PageRankConfig) -> Self {
        self.pagerank = pagerank;
        self
    }

    /// Overrides the community-detection parameters used when no partition
    /// is supplied.
    #[must_use]
    pub const fn with_louvain(mut self, louvain: LouvainConfig) -> Self {
        self.louvain = louvain;
        self
    }

    /// Overrides only the community-detection seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.louvain = self.louvain.with_seed(seed);
        self
    }

    /// Returns the PageRank parameters.
    #[must_use]
    pub const fn pagerank(&self) -> &PageRankConfig {
        &self.pagerank
    }

    /// Returns the community-detection parameters.
    #[must_use]
    pub const fn louvain(&self) -> &LouvainConfig {
        &self.louvain
    }

    /// Detects a partition of `graph` with the builder's Louvain settings.
    #[must_use]
    pub fn detect_partition(&self, graph: &Graph) -> Partition {
        Partition::detect(graph, &self.louvain)
    }

    /// Builds the table over the endpoints of `positives`, deriving the
    /// reference graph and partition from them.
    ///
    /// # Errors
    /// See [`Self::build_with`].
    pub fn build(&self, positives: &BTreeSet<Edge>) -> Result<PairTable> {
        self.build_with(FeatureInputs::new(positives))
    }

    /// Builds the table described by `inputs`.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::UnknownNode`] when a positive edge leaves the
    /// universe and [`LinkDriftError::UnpartitionedNode`] when a supplied
    /// partition misses a universe node.
    #[instrument(
        name = "features.build",
        err,
        skip_all,
        fields(nodes = field::Empty, positives = inputs.positives.len(), rows = field::Empty),
    )]
    pub fn build_with(&self, inputs: FeatureInputs<'_>) -> Result<PairTable> {
        let universe = match inputs.universe {
            Some(universe) => universe.clone(),
            None => endpoints(inputs.positives),
        };
        if let Some(node) = inputs
            .positives
            .iter()
            .flat_map(|edge| [edge.source(), edge.target()])
            .find(|node| !universe.contains(node))
        {
            return Err(LinkDriftError::UnknownNode { node });
        }

        let derived_reference;
        let reference = match inputs.reference {
            Some(graph) => graph,
            None => {
                derived_reference = Graph::with_nodes(
                    universe.iter().copied(),
                    inputs.positives.iter().copied(),
                );
                &derived_reference
            }
        };

        let derived_partition;
        let partition = match inputs.partition {
            Some(partition) => partition,
            None => {
                derived_partition = self.detect_partition(reference);
                &derived_partition
            }
        };
        partition.ensure_covers(&universe)?;

        let span = Span::current();
        span.record("nodes", universe.len());

        let schema = FeatureSchema::for_partition(partition);
        let ranks = reference.pagerank(&self.pagerank);
        let nodes: Vec<NodeId> = universe.iter().copied().collect();
        let profiles = nodes
            .iter()
            .map(|&node| {
                Ok(NodeProfile {
                    degree: reference.degree(node),
                    pagerank: ranks.score(node),
                    community: partition.require(node)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(pair_count(nodes.len()));
        for (i, (&source, source_profile)) in nodes.iter().zip(&profiles).enumerate() {
            for (&target, target_profile) in nodes.iter().zip(&profiles).skip(i + 1) {
                let pair = Edge::from_ordered(source, target);
                rows.push(PairRow {
                    pair,
                    link: inputs.positives.contains(&pair),
                    features: PairFeatures {
                        source_degree: source_profile.degree,
                        target_degree: target_profile.degree,
                        source_pagerank: source_profile.pagerank,
                        target_pagerank: target_profile.pagerank,
                        source_community: source_profile.community,
                        target_community: target_profile.community,
                        common_neighbors: reference.common_neighbors(source, target),
                    },
                });
            }
        }

        span.record("rows", rows.len());
        info!(
            rows = rows.len(),
            columns = schema.width(),
            "pair table built"
        );
        Ok(PairTable {
            schema,
            universe,
            rows,
        })
    }
}

struct NodeProfile {
    degree: usize,
    pagerank: f64,
    community: CommunityId,
}

fn endpoints(edges: &BTreeSet<Edge>) -> BTreeSet<NodeId> {
    edges
        .iter()
        .flat_map(|edge| [edge.source(), edge.target()])
        .collect()
}

#[cfg(test)]
mod tests;
