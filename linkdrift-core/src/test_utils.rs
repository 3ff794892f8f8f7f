//! Shared test utilities for `linkdrift-core`.

use linkdrift_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{edge_source::EdgeSource, error::EdgeSourceError, graph::NodeId};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Builds a standard proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// [`EdgeSource`] implementation that records observation lookups.
#[derive(Clone)]
pub(crate) struct CountingSource {
    pairs: Vec<(u64, u64)>,
    calls: Arc<AtomicUsize>,
}

impl CountingSource {
    #[must_use]
    pub(crate) fn new(pairs: Vec<(u64, u64)>, calls: Arc<AtomicUsize>) -> Self {
        Self { pairs, calls }
    }
}

impl EdgeSource for CountingSource {
    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn name(&self) -> &str {
        "counting"
    }

    fn observation(&self, index: usize) -> Result<(NodeId, NodeId), EdgeSourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let (left, right) = self
            .pairs
            .get(index)
            .ok_or(EdgeSourceError::OutOfBounds { index })?;
        Ok((NodeId::new(*left), NodeId::new(*right)))
    }
}
