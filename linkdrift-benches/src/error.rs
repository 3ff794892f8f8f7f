//! Benchmark setup error type.
//!
//! Aggregates the errors that may arise while preparing benchmark inputs so
//! setup functions can propagate failures with `?`.

use crate::source::SyntheticError;
use linkdrift_core::LinkDriftError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic graph generation failed.
    #[error("synthetic graph generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Loading, feature building or simulation failed.
    #[error("linkdrift operation failed: {0}")]
    Core(#[from] LinkDriftError),
}
