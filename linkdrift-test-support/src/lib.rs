//! Shared test utilities used across linkdrift crates.
//!
//! Fixtures are plain `(u64, u64)` edge lists so this crate stays free of a
//! dependency on `linkdrift-core`, which uses it as a dev-dependency.

pub mod ci;
pub mod fixtures;
pub mod tracing;
