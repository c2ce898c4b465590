//! Error types for minigit.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for minigit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The specified path is not a valid repository.
    #[error("not a repository: {0}")]
    NotARepository(PathBuf),

    /// A repository already exists at the specified path.
    #[error("repository already exists: {0}")]
    AlreadyARepository(PathBuf),

    /// The requested object was not found in the store.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// The requested reference was not found.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// The specified path was not found.
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided string is not a valid object ID.
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    /// The provided string is not a valid reference name.
    #[error("invalid reference name: {0}")]
    InvalidRefName(String),

    /// The stored bytes of an object do not parse as that object kind.
    #[error("corrupt object {oid}: {reason}")]
    CorruptObject {
        /// The object ID.
        oid: String,
        /// The reason the object is considered corrupt.
        reason: String,
    },

    /// Type mismatch when expecting a specific object type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: &'static str,
        /// The actual type.
        actual: &'static str,
    },

    /// A tree was built with two entries sharing the same name.
    #[error("duplicate tree entry: {0}")]
    DuplicateEntry(String),

    /// A commit or ref points at an object id absent from the store.
    #[error("dangling reference to object {0}")]
    DanglingReference(String),

    /// No author identity is configured.
    #[error("user identity is not configured (set user.name and user.email)")]
    MissingIdentity,

    /// Zlib decompression failed.
    #[error("zlib decompression failed")]
    DecompressionFailed,
}

/// Result type alias for minigit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    // E-001: Error can be created from std::io::Error
    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("I/O error"));
    }

    // E-002: Display produces human-readable messages
    #[test]
    fn test_error_display() {
        let error = Error::NotARepository(PathBuf::from("/tmp/not-a-repo"));
        assert_eq!(error.to_string(), "not a repository: /tmp/not-a-repo");

        let error = Error::ObjectNotFound("abc123".to_string());
        assert_eq!(error.to_string(), "object not found: abc123");

        let error = Error::DanglingReference("abc123".to_string());
        assert_eq!(error.to_string(), "dangling reference to object abc123");

        let error = Error::DuplicateEntry("file.txt".to_string());
        assert_eq!(error.to_string(), "duplicate tree entry: file.txt");
    }

    // E-003: Io wraps its source, other variants have none
    #[test]
    fn test_error_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let error: Error = io_error.into();
        assert!(StdError::source(&error).is_some());

        let error = Error::MissingIdentity;
        assert!(StdError::source(&error).is_none());
    }

    // E-004: all variants format without panicking
    #[test]
    fn test_all_error_variants() {
        let errors: Vec<Error> = vec![
            Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "test")),
            Error::NotARepository(PathBuf::from("/test")),
            Error::AlreadyARepository(PathBuf::from("/test/repo")),
            Error::ObjectNotFound("abc".to_string()),
            Error::RefNotFound("refs/heads/master".to_string()),
            Error::PathNotFound(PathBuf::from("/test/path")),
            Error::InvalidOid("xyz".to_string()),
            Error::InvalidRefName("bad ref".to_string()),
            Error::CorruptObject {
                oid: "abc".to_string(),
                reason: "truncated".to_string(),
            },
            Error::TypeMismatch {
                expected: "commit",
                actual: "blob",
            },
            Error::DuplicateEntry("a".to_string()),
            Error::DanglingReference("abc".to_string()),
            Error::MissingIdentity,
            Error::DecompressionFailed,
        ];

        for error in &errors {
            let _ = error.to_string();
            let _ = format!("{:?}", error);
        }
    }
}
