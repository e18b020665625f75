//! Digest to content path mapping
//!
//! Content lives under `<root>/content-v2/<algorithm>/ab/cd/ef01...`, keyed by
//! the hex form of the digest. The two leading directory levels keep any one
//! directory from growing unbounded.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cask_core::{CaskError, CaskResult};
use ssri::{Hash, Integrity};

/// Version of the on-disk content layout
pub const CONTENT_VERSION: &str = "2";

/// Map the first hash of `sri` to its location under `root`.
///
/// Pure: performs no I/O. Fails only when the descriptor is empty or its
/// digest is not valid base64.
pub fn content_path(root: &Path, sri: &Integrity) -> CaskResult<PathBuf> {
    let hash = sri.hashes.first().ok_or_else(|| CaskError::IntegrityParse {
        descriptor: sri.to_string(),
        reason: "descriptor contains no hashes".to_string(),
    })?;
    let hex = hex_digest(hash)?;

    Ok(root
        .join(format!("content-v{}", CONTENT_VERSION))
        .join(hash.algorithm.to_string())
        .join(&hex[0..2])
        .join(&hex[2..4])
        .join(&hex[4..]))
}

/// Hex encoding of a hash's base64 digest
pub(crate) fn hex_digest(hash: &Hash) -> CaskResult<String> {
    let raw = STANDARD
        .decode(hash.digest.as_bytes())
        .map_err(|e| CaskError::IntegrityParse {
            descriptor: hash.to_string(),
            reason: format!("digest is not valid base64: {}", e),
        })?;
    // Shorter than any real digest; the directory split needs five characters
    if raw.len() < 3 {
        return Err(CaskError::IntegrityParse {
            descriptor: hash.to_string(),
            reason: format!("digest is too short ({} bytes)", raw.len()),
        });
    }
    Ok(hex::encode(raw))
}
