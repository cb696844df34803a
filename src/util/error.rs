//! Error types for the imaging adapter layer.
//!
//! Most lookups in this crate never fail: a missing attribute, instancer or
//! material binding resolves to an empty or identity result. Errors are kept
//! for malformed input (paths, config files) and for internal-consistency
//! violations that indicate a bug in the caller.

use thiserror::Error;

use crate::core::ScenePath;

/// Main error type for imaging operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Path string is not a well-formed absolute scene path
    #[error("Invalid scene path: {0:?}")]
    InvalidPath(String),

    /// Internal-consistency violation (programming error in the caller)
    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Internal-consistency violations.
///
/// These are never recoverable: the operation that raised one is aborted and
/// produces no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// An instancer chain link names a path with no node behind it.
    #[error("instancer chain references missing node {0}")]
    MissingNode(ScenePath),

    /// An instancer chain link that must live under a master does not.
    #[error("instancer chain link {0} is not inside a master")]
    NotInMaster(ScenePath),

    /// Walked to the pseudo-root without finding the enclosing master.
    #[error("no master ancestor found above {0}")]
    NoMasterAncestor(ScenePath),
}

impl Error {
    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// True for internal-consistency violations.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Result type alias for imaging operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::invalid_path("a//b");
        assert!(e.to_string().contains("a//b"));

        let path = ScenePath::new("/Master1/cube").unwrap();
        let e: Error = InternalError::NotInMaster(path).into();
        assert!(e.is_internal());
        assert!(e.to_string().contains("/Master1/cube"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_internal());
    }
}
