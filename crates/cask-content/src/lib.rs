//! Integrity-verified content access for cask
//!
//! This crate reads entries out of a content-addressable store. Every entry is
//! addressed by an integrity descriptor (`sha512-...`); reads resolve the
//! descriptor to a file under the store root, then verify size and digest
//! before handing bytes back.
//!
//! Four access modes are provided, each as a free function and as a method on
//! [`ContentStore`]:
//! - buffered read ([`read()`], [`read_sync()`])
//! - streaming read ([`read_stream()`])
//! - copy out of the store ([`copy()`], [`copy_sync()`])
//! - existence probe ([`has_content()`], [`has_content_sync()`])

pub mod copy;
pub mod descriptor;
pub mod has;
pub mod path;
pub mod read;
pub mod resolve;
pub mod store;
pub mod stream;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export main types
pub use copy::{copy, copy_sync};
pub use descriptor::Descriptor;
pub use has::{has_content, has_content_sync, ContentInfo};
pub use path::content_path;
pub use read::{read, read_sync};
pub use store::ContentStore;
pub use stream::{read_stream, ContentStream};

pub use cask_core::{CaskError, CaskResult, ContentConfig, ErrorCode, Platform, ReadOpts};
pub use ssri::{Algorithm, Integrity};
