//! Content store handle
//!
//! [`ContentStore`] bundles a store root with its [`ContentConfig`] so callers
//! do not have to thread both through every call.

use std::path::{Path, PathBuf};

use cask_core::{CaskResult, ContentConfig, ReadOpts};
use ssri::Integrity;

use crate::copy::{copy_sync, copy_with_config};
use crate::descriptor::Descriptor;
use crate::has::{has_content_sync, has_content_with_config, ContentInfo};
use crate::path::content_path;
use crate::read::{read_sync, read_with_config};
use crate::resolve::candidate_paths;
use crate::stream::{read_stream_with_config, ContentStream};

/// Read-only view of a content-addressable store
#[derive(Debug, Clone)]
pub struct ContentStore {
    /// Root directory of the store
    root_path: PathBuf,
    config: ContentConfig,
}

impl ContentStore {
    /// Open a store at `root_path` with default settings. Nothing is touched
    /// on disk until an operation runs.
    pub fn new<P: AsRef<Path>>(root_path: P) -> Self {
        Self::with_config(root_path, ContentConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(root_path: P, config: ContentConfig) -> Self {
        Self {
            root_path: root_path.as_ref().to_path_buf(),
            config,
        }
    }

    /// Get the root path of the store
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Where the first hash of `sri` lives in this store
    pub fn content_path(&self, sri: &Integrity) -> CaskResult<PathBuf> {
        content_path(&self.root_path, sri)
    }

    /// Every candidate location for `descriptor`, in resolution order
    pub fn candidate_paths<D>(&self, descriptor: &D) -> CaskResult<Vec<(PathBuf, Integrity)>>
    where
        D: Descriptor + ?Sized,
    {
        candidate_paths(&self.root_path, descriptor)
    }
}

impl ContentStore {
    /// Read and verify content
    pub async fn read<D>(&self, descriptor: &D, opts: &ReadOpts) -> CaskResult<Vec<u8>>
    where
        D: Descriptor + ?Sized,
    {
        read_with_config(&self.root_path, descriptor, opts, &self.config).await
    }

    pub fn read_sync<D>(&self, descriptor: &D, opts: &ReadOpts) -> CaskResult<Vec<u8>>
    where
        D: Descriptor + ?Sized,
    {
        read_sync(&self.root_path, descriptor, opts)
    }

    /// Stream and verify content; see [`crate::stream`]
    pub fn read_stream<D>(&self, descriptor: &D, opts: &ReadOpts) -> ContentStream
    where
        D: Descriptor + ?Sized,
    {
        read_stream_with_config(&self.root_path, descriptor, opts, &self.config)
    }

    /// Copy content to `dest`
    pub async fn copy<D>(&self, descriptor: &D, dest: &Path) -> CaskResult<u64>
    where
        D: Descriptor + ?Sized,
    {
        copy_with_config(&self.root_path, descriptor, dest, &self.config).await
    }

    pub fn copy_sync<D>(&self, descriptor: &D, dest: &Path) -> CaskResult<u64>
    where
        D: Descriptor + ?Sized,
    {
        copy_sync(&self.root_path, descriptor, dest)
    }

    /// Look up content without reading it
    pub async fn has_content<D>(&self, descriptor: &D) -> CaskResult<Option<ContentInfo>>
    where
        D: Descriptor + ?Sized,
    {
        has_content_with_config(&self.root_path, descriptor, &self.config).await
    }

    pub fn has_content_sync<D>(&self, descriptor: &D) -> CaskResult<Option<ContentInfo>>
    where
        D: Descriptor + ?Sized,
    {
        has_content_sync(&self.root_path, descriptor, self.config.platform)
    }

    /// Check if content exists in store
    pub fn contains<D>(&self, descriptor: &D) -> bool
    where
        D: Descriptor + ?Sized,
    {
        matches!(self.has_content_sync(descriptor), Ok(Some(_)))
    }
}
