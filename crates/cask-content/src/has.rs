//! Existence checks
//!
//! Answers "is this content in the store?" by resolving the descriptor and
//! stat-ing the winning path. Absence is an answer, not an error. On Windows a
//! permission error is also treated as absence, since that platform reports
//! some missing-file conditions that way; elsewhere it is a real error.

use std::fs::Metadata;
use std::path::Path;

use cask_core::{CaskError, CaskResult, ContentConfig, ErrorCode, Platform};
use ssri::Integrity;
use tracing::warn;

use crate::descriptor::Descriptor;
use crate::resolve::{with_content_path, with_content_path_sync};

/// What the existence check learned about a present entry
#[derive(Debug, Clone)]
pub struct ContentInfo {
    /// Size in bytes
    pub size: u64,
    /// The digest the entry was found under
    pub sri: Integrity,
    /// Filesystem metadata of the content file
    pub metadata: Metadata,
}

impl ContentInfo {
    fn from_metadata(sri: Integrity, metadata: Metadata) -> Self {
        Self {
            size: metadata.len(),
            sri,
            metadata,
        }
    }
}

/// Check whether content for `descriptor` is present. An empty descriptor is
/// never present and causes no I/O.
pub async fn has_content<D>(
    root: &Path,
    descriptor: &D,
    platform: Platform,
) -> CaskResult<Option<ContentInfo>>
where
    D: Descriptor + ?Sized,
{
    has_content_with_config(
        root,
        descriptor,
        &ContentConfig::default().with_platform(platform),
    )
    .await
}

pub(crate) async fn has_content_with_config<D>(
    root: &Path,
    descriptor: &D,
    config: &ContentConfig,
) -> CaskResult<Option<ContentInfo>>
where
    D: Descriptor + ?Sized,
{
    if descriptor.is_absent() {
        return Ok(None);
    }
    let outcome = with_content_path(root, descriptor, config.max_fanout, |cpath, sri| async move {
        let metadata = tokio::fs::metadata(&cpath)
            .await
            .map_err(|e| CaskError::io(format!("Failed to stat content file {}", cpath.display()), e))?;
        Ok(ContentInfo::from_metadata(sri, metadata))
    })
    .await;
    absent_unless_error(outcome, config.platform)
}

/// Blocking counterpart of [`has_content`]
pub fn has_content_sync<D>(
    root: &Path,
    descriptor: &D,
    platform: Platform,
) -> CaskResult<Option<ContentInfo>>
where
    D: Descriptor + ?Sized,
{
    if descriptor.is_absent() {
        return Ok(None);
    }
    let outcome = with_content_path_sync(root, descriptor, |cpath, sri| {
        let metadata = std::fs::metadata(&cpath)
            .map_err(|e| CaskError::io(format!("Failed to stat content file {}", cpath.display()), e))?;
        Ok(ContentInfo::from_metadata(sri, metadata))
    });
    absent_unless_error(outcome, platform)
}

fn absent_unless_error(
    outcome: CaskResult<ContentInfo>,
    platform: Platform,
) -> CaskResult<Option<ContentInfo>> {
    match outcome {
        Ok(info) => Ok(Some(info)),
        Err(err) => match err.code() {
            ErrorCode::NotFound => Ok(None),
            ErrorCode::PermissionDenied if platform.is_windows() => {
                warn!(error = %err, "treating permission error as missing content");
                Ok(None)
            }
            _ => Err(err),
        },
    }
}
