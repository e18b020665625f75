//! Store fixtures for tests.
//!
//! Writing content is not part of this crate, so tests place bytes at the
//! path a digest maps to directly.

use std::fs;
use std::path::Path;

use cask_core::utils::compute_integrity;
use ssri::{Algorithm, Integrity};

use crate::path::content_path;

/// Write `data` at its sha512 content path and return its descriptor
pub fn write_content(root: &Path, data: &[u8]) -> Integrity {
    write_content_with(root, data, Algorithm::Sha512)
}

/// Write `data` at its content path under `algorithm`
pub fn write_content_with(root: &Path, data: &[u8], algorithm: Algorithm) -> Integrity {
    let sri = compute_integrity(data, algorithm);
    let path = content_path(root, &sri).unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, data).unwrap();
    sri
}

/// Overwrite the stored bytes for `sri` without changing its path
pub fn corrupt_content(root: &Path, sri: &Integrity, data: &[u8]) {
    let path = content_path(root, sri).unwrap();
    fs::write(path, data).unwrap();
}

/// Descriptor for content that was never stored
pub fn absent_content(data: &[u8]) -> Integrity {
    compute_integrity(data, Algorithm::Sha512)
}

/// Concatenate descriptors, keeping the given candidate order
pub fn join(sris: &[&Integrity]) -> Integrity {
    Integrity {
        hashes: sris.iter().flat_map(|sri| sri.hashes.iter().cloned()).collect(),
    }
}
