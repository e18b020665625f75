//! Buffered reads
//!
//! Reads a whole entry into memory, checks its length against the declared
//! size (if any), then verifies it against the resolved digest.

use std::path::Path;

use cask_core::{CaskError, CaskResult, ContentConfig, ReadOpts};
use ssri::Integrity;

use crate::descriptor::Descriptor;
use crate::resolve::{with_content_path, with_content_path_sync};

/// Validate bytes read from `path` against `sri`. The size check runs first
/// since it is cheaper than hashing.
pub(crate) fn verify_content(
    data: &[u8],
    size: Option<u64>,
    sri: &Integrity,
    path: &Path,
) -> CaskResult<()> {
    if let Some(expected) = size {
        let found = data.len() as u64;
        if expected != found {
            return Err(CaskError::bad_size(expected, found));
        }
    }
    sri.check(data)
        .map_err(|_| CaskError::integrity_mismatch(sri.clone(), path))?;
    Ok(())
}

/// Read and verify the content addressed by `descriptor`
pub async fn read<D>(root: &Path, descriptor: &D, opts: &ReadOpts) -> CaskResult<Vec<u8>>
where
    D: Descriptor + ?Sized,
{
    read_with_config(root, descriptor, opts, &ContentConfig::default()).await
}

pub(crate) async fn read_with_config<D>(
    root: &Path,
    descriptor: &D,
    opts: &ReadOpts,
    config: &ContentConfig,
) -> CaskResult<Vec<u8>>
where
    D: Descriptor + ?Sized,
{
    let size = opts.size;
    with_content_path(root, descriptor, config.max_fanout, |cpath, sri| async move {
        let data = tokio::fs::read(&cpath)
            .await
            .map_err(|e| CaskError::io(format!("Failed to read content file {}", cpath.display()), e))?;
        verify_content(&data, size, &sri, &cpath)?;
        Ok(data)
    })
    .await
}

/// Blocking counterpart of [`read`]
pub fn read_sync<D>(root: &Path, descriptor: &D, opts: &ReadOpts) -> CaskResult<Vec<u8>>
where
    D: Descriptor + ?Sized,
{
    let size = opts.size;
    with_content_path_sync(root, descriptor, |cpath, sri| {
        let data = std::fs::read(&cpath)
            .map_err(|e| CaskError::io(format!("Failed to read content file {}", cpath.display()), e))?;
        verify_content(&data, size, &sri, &cpath)?;
        Ok(data)
    })
}
