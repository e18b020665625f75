//! Accepted forms of integrity descriptors.
//!
//! Operations take either a textual descriptor (`"sha512-... sha1-..."`) or an
//! already-parsed [`Integrity`]. An empty descriptor means "no descriptor":
//! the existence check answers "not present" for it without touching disk.

use cask_core::{CaskError, CaskResult};
use ssri::Integrity;

use crate::path::hex_digest;

/// Something that can be turned into a validated [`Integrity`]
pub trait Descriptor {
    /// True when no digest was supplied at all
    fn is_absent(&self) -> bool;

    /// Parse and validate into an [`Integrity`] with at least one hash
    fn to_integrity(&self) -> CaskResult<Integrity>;
}

impl Descriptor for str {
    fn is_absent(&self) -> bool {
        self.trim().is_empty()
    }

    fn to_integrity(&self) -> CaskResult<Integrity> {
        let sri = self
            .parse::<Integrity>()
            .map_err(|e| CaskError::IntegrityParse {
                descriptor: self.to_string(),
                reason: e.to_string(),
            })?;
        validate(sri, self)
    }
}

impl Descriptor for String {
    fn is_absent(&self) -> bool {
        self.as_str().is_absent()
    }

    fn to_integrity(&self) -> CaskResult<Integrity> {
        self.as_str().to_integrity()
    }
}

impl Descriptor for Integrity {
    fn is_absent(&self) -> bool {
        self.hashes.is_empty()
    }

    fn to_integrity(&self) -> CaskResult<Integrity> {
        validate(self.clone(), &self.to_string())
    }
}

/// Checks the hashes and orders them strongest algorithm first. The sort is
/// stable, so digests of one algorithm keep their descriptor order.
fn validate(mut sri: Integrity, text: &str) -> CaskResult<Integrity> {
    if sri.hashes.is_empty() {
        return Err(CaskError::IntegrityParse {
            descriptor: text.to_string(),
            reason: "descriptor contains no hashes".to_string(),
        });
    }
    for hash in &sri.hashes {
        hex_digest(hash)?;
    }
    sri.hashes.sort();
    Ok(sri)
}
