//! Edge source abstractions for loading graph snapshots.

use std::{collections::BTreeSet, sync::Arc};

use tracing::{info, instrument};

use crate::{
    error::{EdgeSourceError, LinkDriftError, Result},
    graph::{Edge, Graph, NodeId},
};

/// Abstraction over a sequence of undirected observations between nodes.
///
/// Observations may repeat and may arrive in either orientation; they are
/// collapsed into a set of normalised [`Edge`]s.
///
/// # Examples
/// ```
/// use linkdrift_core::{EdgeSource, EdgeSourceError, NodeId};
///
/// struct Pairs(Vec<(u64, u64)>);
///
/// impl EdgeSource for Pairs {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "pairs" }
///     fn observation(&self, index: usize) -> Result<(NodeId, NodeId), EdgeSourceError> {
///         let (a, b) = self.0.get(index).ok_or(EdgeSourceError::OutOfBounds { index })?;
///         Ok((NodeId::new(*a), NodeId::new(*b)))
///     }
/// }
///
/// let source = Pairs(vec![(0, 1), (1, 0), (2, 1)]);
/// assert_eq!(source.len(), 3);
/// assert_eq!(source.edges()?.len(), 2);
/// assert_eq!(source.graph()?.node_count(), 3);
/// # Ok::<(), EdgeSourceError>(())
/// ```
pub trait EdgeSource {
    /// Returns the number of observations.
    fn len(&self) -> usize;

    /// Returns whether the source holds no observations.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Returns the endpoints of one observation.
    fn observation(&self, index: usize) -> core::result::Result<(NodeId, NodeId), EdgeSourceError>;

    /// Collapses every observation into a set of normalised edges.
    ///
    /// # Errors
    /// Returns [`EdgeSourceError::EmptySource`] when there are no
    /// observations and [`EdgeSourceError::SelfLoop`] when an observation
    /// names the same node twice. Errors from [`EdgeSource::observation`]
    /// propagate unchanged.
    fn edges(&self) -> core::result::Result<BTreeSet<Edge>, EdgeSourceError> {
        if self.is_empty() {
            return Err(EdgeSourceError::EmptySource);
        }
        (0..self.len())
            .map(|index| {
                let (left, right) = self.observation(index)?;
                Edge::new(left, right).map_err(|_| EdgeSourceError::SelfLoop { index, node: left })
            })
            .collect()
    }

    /// Builds the snapshot spanned by [`EdgeSource::edges`].
    ///
    /// # Errors
    /// Propagates failures from [`EdgeSource::edges`].
    fn graph(&self) -> core::result::Result<Graph, EdgeSourceError> {
        self.edges().map(Graph::from_edges)
    }
}

/// Loads the snapshot held by `source`, tagging failures with its name.
///
/// # Errors
/// Returns [`LinkDriftError::EdgeSource`] wrapping the underlying
/// [`EdgeSourceError`].
#[instrument(name = "core.load", err, skip(source), fields(edge_source = %source.name()))]
pub fn load_graph<S: EdgeSource + ?Sized>(source: &S) -> Result<Graph> {
    let graph = source
        .graph()
        .map_err(|error| LinkDriftError::EdgeSource {
            edge_source: Arc::from(source.name()),
            error,
        })?;
    info!(
        observations = source.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "edge source loaded"
    );
    Ok(graph)
}
