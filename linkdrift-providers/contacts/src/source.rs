//! Edge source views over contact events.

use linkdrift_core::{EdgeSource, EdgeSourceError, NodeId};

use crate::log::{ContactEvent, ContactLog};

/// Borrowed run of contact events exposed as an [`EdgeSource`].
///
/// Each event is one observation; repeated contacts between the same pair
/// collapse into a single edge when the source is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactWindow<'a> {
    name: String,
    events: &'a [ContactEvent],
}

impl<'a> ContactWindow<'a> {
    pub(crate) fn new(name: String, events: &'a [ContactEvent]) -> Self {
        Self { name, events }
    }

    /// Returns the events covered by this window.
    #[must_use]
    pub fn events(&self) -> &'a [ContactEvent] {
        self.events
    }
}

impl EdgeSource for ContactWindow<'_> {
    fn len(&self) -> usize {
        self.events.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observation(&self, index: usize) -> Result<(NodeId, NodeId), EdgeSourceError> {
        self.events
            .get(index)
            .map(|event| (event.source, event.target))
            .ok_or(EdgeSourceError::OutOfBounds { index })
    }
}

impl EdgeSource for ContactLog {
    fn len(&self) -> usize {
        ContactLog::len(self)
    }

    fn name(&self) -> &str {
        ContactLog::name(self)
    }

    fn observation(&self, index: usize) -> Result<(NodeId, NodeId), EdgeSourceError> {
        self.events()
            .get(index)
            .map(|event| (event.source, event.target))
            .ok_or(EdgeSourceError::OutOfBounds { index })
    }
}
