//! # cask-core
//!
//! Core types and utilities shared across all cask crates.
//!
//! This crate provides:
//! - `CaskError` and the `ErrorCode` discriminator used by every content operation
//! - `Platform`, `ReadOpts` and `ContentConfig`, the knobs threaded into reads
//! - Integrity helpers for computing descriptors over byte buffers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `error`: Error types, codes and result aliases
//! - `types`: Platform and option types
//! - `utils`: Integrity helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{CaskError, CaskResult, ErrorCode};
pub use types::{ContentConfig, Platform, ReadOpts};
