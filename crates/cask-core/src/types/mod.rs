//! Core data types for content access.
//!
//! - `Platform` selects platform-conditional error policy
//! - `ReadOpts` carries per-call options
//! - `ContentConfig` carries per-store settings

pub mod options;
pub mod platform;

// Re-export all public types
pub use options::{ContentConfig, ReadOpts};
pub use platform::Platform;
