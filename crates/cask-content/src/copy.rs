//! Copying content out of the store
//!
//! Copies go straight from the content path to the destination through the
//! platform copy routine (`copy_file_range`, `clonefile` or `CopyFileEx`
//! where the OS offers them). Stored entries were verified when written, so
//! the bytes are not re-hashed here.

use std::path::Path;

use cask_core::{CaskError, CaskResult, ContentConfig};

use crate::descriptor::Descriptor;
use crate::resolve::{with_content_path, with_content_path_sync};

/// Copy the content addressed by `descriptor` to `dest`, returning the number
/// of bytes copied. The destination's parent directory must already exist.
pub async fn copy<D>(root: &Path, descriptor: &D, dest: &Path) -> CaskResult<u64>
where
    D: Descriptor + ?Sized,
{
    copy_with_config(root, descriptor, dest, &ContentConfig::default()).await
}

pub(crate) async fn copy_with_config<D>(
    root: &Path,
    descriptor: &D,
    dest: &Path,
    config: &ContentConfig,
) -> CaskResult<u64>
where
    D: Descriptor + ?Sized,
{
    with_content_path(root, descriptor, config.max_fanout, |cpath, _| async move {
        tokio::fs::copy(&cpath, dest).await.map_err(|e| {
            CaskError::io(
                format!("Failed to copy {} to {}", cpath.display(), dest.display()),
                e,
            )
        })
    })
    .await
}

/// Blocking counterpart of [`copy`]
pub fn copy_sync<D>(root: &Path, descriptor: &D, dest: &Path) -> CaskResult<u64>
where
    D: Descriptor + ?Sized,
{
    with_content_path_sync(root, descriptor, |cpath, _| {
        std::fs::copy(&cpath, dest).map_err(|e| {
            CaskError::io(
                format!("Failed to copy {} to {}", cpath.display(), dest.display()),
                e,
            )
        })
    })
}
