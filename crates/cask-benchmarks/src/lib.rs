//! cask benchmarking suite
//!
//! Benchmarks for the content access paths: buffered, sync and streamed
//! reads, plus existence checks across multi-candidate descriptors.

pub mod common;

pub use common::*;
