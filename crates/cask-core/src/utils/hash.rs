//! Integrity descriptor helpers.
//!
//! Computes `ssri` descriptors for buffers and files, used to build store
//! fixtures and by the CLI's `hash` command.

use std::path::Path;

use ssri::{Algorithm, Integrity, IntegrityOpts};

use crate::error::{CaskError, CaskResult};

/// Compute the integrity descriptor of `data` under `algorithm`
pub fn compute_integrity(data: &[u8], algorithm: Algorithm) -> Integrity {
    IntegrityOpts::new().algorithm(algorithm).chain(data).result()
}

/// Compute the integrity descriptor of a file's contents
pub fn compute_file_integrity(path: &Path, algorithm: Algorithm) -> CaskResult<Integrity> {
    let data = std::fs::read(path)
        .map_err(|e| CaskError::io(format!("Failed to read file: {}", path.display()), e))?;
    Ok(compute_integrity(&data, algorithm))
}

/// Parse an algorithm name such as `sha512`
pub fn parse_algorithm(name: &str) -> CaskResult<Algorithm> {
    name.trim()
        .to_ascii_lowercase()
        .parse::<Algorithm>()
        .map_err(|e| CaskError::ConfigValidation {
            field: "algorithm".to_string(),
            reason: format!("unsupported hash algorithm '{}': {}", name, e),
        })
}
