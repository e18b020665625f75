//! Utility functions and helpers.
//!
//! Common functionality used across multiple cask crates.

pub mod hash;

// Re-export commonly used utilities
pub use hash::{compute_file_integrity, compute_integrity, parse_algorithm};
