//! Node identifiers and normalised undirected edges.

use std::fmt;

use crate::error::{LinkDriftError, Result};

/// Opaque identifier for a node in a graph snapshot.
///
/// # Examples
/// ```
/// use linkdrift_core::NodeId;
///
/// let id = NodeId::new(4);
/// assert_eq!(id.get(), 4);
/// assert!(NodeId::new(1) < id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new node identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unordered pair of distinct nodes, stored with `source < target`.
///
/// # Examples
/// ```
/// use linkdrift_core::{Edge, NodeId};
///
/// let edge = Edge::new(NodeId::new(7), NodeId::new(2))?;
/// assert_eq!(edge.source(), NodeId::new(2));
/// assert_eq!(edge.target(), NodeId::new(7));
/// assert_eq!(edge, Edge::new(NodeId::new(2), NodeId::new(7))?);
/// # Ok::<(), linkdrift_core::LinkDriftError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
}

impl Edge {
    /// Builds an edge between two nodes, ordering the endpoints.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::SelfLoop`] when both endpoints are equal.
    pub fn new(left: NodeId, right: NodeId) -> Result<Self> {
        match left.cmp(&right) {
            std::cmp::Ordering::Less => Ok(Self {
                source: left,
                target: right,
            }),
            std::cmp::Ordering::Greater => Ok(Self {
                source: right,
                target: left,
            }),
            std::cmp::Ordering::Equal => Err(LinkDriftError::SelfLoop { node: left }),
        }
    }

    /// Builds an edge from raw identifiers.
    ///
    /// # Errors
    /// Returns [`LinkDriftError::SelfLoop`] when both endpoints are equal.
    pub fn from_raw(left: u64, right: u64) -> Result<Self> {
        Self::new(NodeId::new(left), NodeId::new(right))
    }

    /// Builds an edge from endpoints already known to satisfy `source < target`.
    pub(crate) const fn from_ordered(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    /// Returns the smaller endpoint.
    #[must_use]
    pub const fn source(self) -> NodeId {
        self.source
    }

    /// Returns the larger endpoint.
    #[must_use]
    pub const fn target(self) -> NodeId {
        self.target
    }

    /// Returns `true` when `node` is one of the endpoints.
    #[must_use]
    pub fn touches(self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}
