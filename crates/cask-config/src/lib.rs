//! Configuration loading for cask
//!
//! Reads `cask.toml` (project or global) and layers environment and
//! command-line overrides on top, producing the store root and
//! [`ContentConfig`](cask_core::ContentConfig) the content operations run with.

pub mod merge;
pub mod toml;

// Re-export main types
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource, ResolvedConfig};
pub use toml::{CaskToml, ContentSection, StoreSection};

use cask_core::CaskError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, CaskError>;
