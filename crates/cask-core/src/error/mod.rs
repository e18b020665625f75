//! Error types and result aliases for cask operations.
//!
//! Every failure surfaced by a content operation carries an [`ErrorCode`]
//! so callers can branch on the class of failure (missing, forbidden,
//! wrong size, corrupt) without matching on message text.

use std::fmt;
use std::io;
use std::path::PathBuf;

use ssri::Integrity;
use thiserror::Error;

/// Unified error type for all cask operations
#[derive(Error, Debug)]
pub enum CaskError {
    // Content errors
    #[error("Bad data size: expected {expected} bytes, but found {found} instead")]
    BadSize { expected: u64, found: u64 },

    #[error("Integrity verification failed for {sri} ({})", .path.display())]
    IntegrityMismatch { sri: Integrity, path: PathBuf },

    #[error("No matching content found for {sri}")]
    NotFound { sri: Integrity },

    #[error("Failed to parse integrity descriptor '{descriptor}': {reason}")]
    IntegrityParse { descriptor: String, reason: String },

    // Config errors
    #[error("Failed to parse {file}: {message}")]
    TomlParse { file: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for cask operations
pub type CaskResult<T> = Result<T, CaskError>;

/// Coarse failure class, mirroring the POSIX-style codes content
/// consumers conventionally switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `ENOENT`: no candidate resolved to a present file
    NotFound,
    /// `EPERM`: permission denied
    PermissionDenied,
    /// `EBADSIZE`: byte length disagrees with the declared size
    BadSize,
    /// `EINTEGRITY`: bytes do not match the claimed digest
    Integrity,
    /// Anything else
    Other,
}

impl ErrorCode {
    /// The conventional code string, or `None` for unclassified errors
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            ErrorCode::NotFound => Some("ENOENT"),
            ErrorCode::PermissionDenied => Some("EPERM"),
            ErrorCode::BadSize => Some("EBADSIZE"),
            ErrorCode::Integrity => Some("EINTEGRITY"),
            ErrorCode::Other => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("EUNKNOWN"))
    }
}

impl CaskError {
    /// Create an IO error from std::io::Error
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Size mismatch between what the caller declared and what was read
    pub fn bad_size(expected: u64, found: u64) -> Self {
        Self::BadSize { expected, found }
    }

    /// Stored bytes at `path` do not verify against `sri`
    pub fn integrity_mismatch(sri: Integrity, path: impl Into<PathBuf>) -> Self {
        Self::IntegrityMismatch {
            sri,
            path: path.into(),
        }
    }

    /// Aggregate "nothing found" for a whole descriptor
    pub fn not_found(sri: Integrity) -> Self {
        Self::NotFound { sri }
    }

    /// Classify this error
    pub fn code(&self) -> ErrorCode {
        match self {
            CaskError::BadSize { .. } => ErrorCode::BadSize,
            CaskError::IntegrityMismatch { .. } => ErrorCode::Integrity,
            CaskError::NotFound { .. } => ErrorCode::NotFound,
            CaskError::Io { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => ErrorCode::NotFound,
                io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
                _ => ErrorCode::Other,
            },
            _ => ErrorCode::Other,
        }
    }

    /// Shorthand for `code() == ErrorCode::NotFound`
    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }

    /// Check if this error is recoverable by re-fetching content.
    /// Corrupt or mis-sized content is never recoverable in place.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CaskError::NotFound { .. } | CaskError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CaskError::NotFound { .. } => {
                Some("Check the store root or re-fetch the content into the store")
            }
            CaskError::IntegrityMismatch { .. } => {
                Some("The stored file is corrupt; remove it and re-fetch the content")
            }
            CaskError::BadSize { .. } => {
                Some("The declared size does not match the stored content; check the metadata it came from")
            }
            CaskError::IntegrityParse { .. } => {
                Some("Integrity descriptors look like 'sha512-<base64 digest>'")
            }
            CaskError::Io { .. } if self.code() == ErrorCode::PermissionDenied => {
                Some("Run with permissions that allow reading the store")
            }
            _ => None,
        }
    }
}
