//! One rewiring step: random removal followed by score-ranked addition.

use std::{cmp::Ordering, collections::BTreeSet, fmt, num::NonZeroUsize};

use rand::{Rng, seq::index};
use tracing::{debug, instrument};

use crate::{
    error::{LinkDriftError, Result},
    features::{FeatureBuilder, FeatureInputs, PairTable},
    graph::{Edge, Graph},
    partition::Partition,
    scorer::Scorer,
};

/// Stage of a rewiring step that ran short of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewireStage {
    /// Sampling existing edges to drop.
    Removal,
    /// Selecting non-edges to add.
    Addition,
}

impl fmt::Display for RewireStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Removal => "removal",
            Self::Addition => "addition",
        })
    }
}

/// Candidate pair with its link probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    /// The candidate pair.
    pub pair: Edge,
    /// Probability assigned by the scorer.
    pub probability: f64,
}

/// Snapshot left after the removal stage of a rewiring step.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    /// Snapshot without the removed edges. Every node is kept.
    pub graph: Graph,
    /// Edges dropped, in ascending order.
    pub removed: Vec<Edge>,
}

impl Removal {
    /// Builds the candidate table over the reduced snapshot, so degrees,
    /// PageRank and common neighbours no longer count the removed edges.
    ///
    /// # Errors
    /// Propagates [`FeatureBuilder::build_with`] failures, such as a
    /// partition that misses a node.
    pub fn candidates(&self, features: &FeatureBuilder, partition: &Partition) -> Result<PairTable> {
        features.build_with(
            FeatureInputs::new(self.graph.edges())
                .with_universe(self.graph.nodes())
                .with_reference(&self.graph)
                .with_partition(partition),
        )
    }
}

/// Result of one rewiring step.
#[derive(Debug, Clone, PartialEq)]
pub struct RewireOutcome {
    /// Snapshot after removal and addition.
    pub graph: Graph,
    /// Edges dropped, in ascending order.
    pub removed: Vec<Edge>,
    /// Edges added, in selection order.
    pub added: Vec<Edge>,
}

/// Applies rewiring steps that keep the edge count constant.
///
/// # Examples
/// ```
/// use linkdrift_core::{LinkDriftError, Rewirer};
///
/// assert_eq!(Rewirer::new(3)?.removal_count(), 3);
/// assert_eq!(
///     Rewirer::new(0).unwrap_err(),
///     LinkDriftError::InvalidRemovalCount { got: 0 },
/// );
/// # Ok::<(), LinkDriftError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewirer {
    removal_count: NonZeroUsize,
}

impl Rewirer {
    /// Creates a rewirer that swaps `removal_count` edges per step.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::InvalidRemovalCount`] when `removal_count`
    /// is zero.
    pub fn new(removal_count: usize) -> Result<Self> {
        NonZeroUsize::new(removal_count)
            .map(|removal_count| Self { removal_count })
            .ok_or(LinkDriftError::InvalidRemovalCount { got: removal_count })
    }

    /// Returns the number of edges swapped per step.
    #[must_use]
    pub const fn removal_count(&self) -> usize {
        self.removal_count.get()
    }

    /// Runs a full step: [`Self::remove`], candidate features over the
    /// reduced snapshot, then [`Self::add`].
    ///
    /// Removed edges stay eligible for re-addition but are scored as the
    /// non-edges they now are.
    ///
    /// # Errors
    /// Propagates failures from both stages and from building the candidate
    /// table.
    #[instrument(
        name = "rewire.apply",
        err,
        skip_all,
        fields(removals = self.removal_count.get(), edges = graph.edge_count()),
    )]
    pub fn apply<S, R>(
        &self,
        graph: &Graph,
        features: &FeatureBuilder,
        partition: &Partition,
        scorer: &S,
        rng: &mut R,
    ) -> Result<RewireOutcome>
    where
        S: Scorer + ?Sized,
        R: Rng + ?Sized,
    {
        let removal = self.remove(graph, rng)?;
        let candidates = removal.candidates(features, partition)?;
        self.add(removal, &candidates, scorer)
    }

    /// Drops `r` edges sampled uniformly from `graph`.
    ///
    /// Nodes left without edges remain in the snapshot.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::InsufficientCandidates`] when `graph` has
    /// fewer than `r` edges.
    pub fn remove<R>(&self, graph: &Graph, rng: &mut R) -> Result<Removal>
    where
        R: Rng + ?Sized,
    {
        let r = self.removal_count.get();
        let edges: Vec<Edge> = graph.edges().iter().copied().collect();
        if r > edges.len() {
            return Err(LinkDriftError::InsufficientCandidates {
                stage: RewireStage::Removal,
                requested: r,
                available: edges.len(),
            });
        }

        let mut picks = index::sample(rng, edges.len(), r).into_vec();
        picks.sort_unstable();
        let removed: Vec<Edge> = picks.into_iter().filter_map(|i| edges.get(i).copied()).collect();
        let mut remaining: BTreeSet<Edge> = graph.edges().clone();
        for edge in &removed {
            remaining.remove(edge);
        }
        Ok(Removal {
            graph: Graph::with_nodes(graph.nodes().iter().copied(), remaining),
            removed,
        })
    }

    /// Adds the `r` highest-scoring pairs of `candidates` that are not edges
    /// of the reduced snapshot.
    ///
    /// Equal probabilities are broken by ascending `(source, target)`.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::CandidateTableMismatch`] when `candidates`
    /// was not built over the nodes of the snapshot,
    /// [`LinkDriftError::InsufficientCandidates`] when fewer than `r`
    /// non-edges exist, and propagates scorer failures.
    pub fn add<S>(&self, removal: Removal, candidates: &PairTable, scorer: &S) -> Result<RewireOutcome>
    where
        S: Scorer + ?Sized,
    {
        let Removal { graph, removed } = removal;
        if candidates.universe() != graph.nodes() {
            return Err(LinkDriftError::CandidateTableMismatch {
                table_nodes: candidates.universe().len(),
                graph_nodes: graph.node_count(),
            });
        }
        let r = self.removal_count.get();
        let ranked = rank_candidates(candidates, graph.edges(), scorer)?;
        if ranked.len() < r {
            return Err(LinkDriftError::InsufficientCandidates {
                stage: RewireStage::Addition,
                requested: r,
                available: ranked.len(),
            });
        }
        let added: Vec<Edge> = ranked.iter().take(r).map(|scored| scored.pair).collect();
        let mut edges = graph.edges().clone();
        edges.extend(added.iter().copied());

        debug!(
            removed = removed.len(),
            added = added.len(),
            readded = added.iter().filter(|edge| removed.contains(edge)).count(),
            "rewiring step applied"
        );
        Ok(RewireOutcome {
            graph: Graph::with_nodes(graph.nodes().iter().copied(), edges),
            removed,
            added,
        })
    }
}

/// Scores every row of `candidates` whose pair is not in `exclude`, ordered
/// by descending probability then ascending pair.
///
/// # Errors
/// Propagates scorer failures.
pub fn rank_candidates<S>(
    candidates: &PairTable,
    exclude: &BTreeSet<Edge>,
    scorer: &S,
) -> Result<Vec<ScoredPair>>
where
    S: Scorer + ?Sized,
{
    let schema = candidates.schema();
    let mut scored = candidates
        .rows()
        .iter()
        .filter(|row| !exclude.contains(&row.pair()))
        .map(|row| {
            scorer
                .score(&row.features().encode(schema))
                .map(|probability| ScoredPair {
                    pair: row.pair(),
                    probability,
                })
        })
        .collect::<Result<Vec<_>>>()?;
    scored.sort_by(compare_ranked);
    Ok(scored)
}

fn compare_ranked(left: &ScoredPair, right: &ScoredPair) -> Ordering {
    right
        .probability
        .total_cmp(&left.probability)
        .then_with(|| left.pair.cmp(&right.pair))
}
