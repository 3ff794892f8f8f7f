//! Benchmark support crate for linkdrift.
//!
//! Provides seeded planted-partition graphs and parameter types used by
//! Criterion benchmarks for pair-table construction and simulator
//! iterations.

pub mod error;
pub mod params;
pub mod source;
