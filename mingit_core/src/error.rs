//! Error types for mingit_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using mingit_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during repository operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error on the working tree or the metadata directory.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Object not found in store.
    #[error("Object not found: {hash}")]
    ObjectNotFound { hash: String },

    /// Path not found in the working tree.
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Commit chain or tree graph is broken.
    #[error("Corrupt history: {reason}")]
    CorruptHistory { reason: String },

    /// Object file is corrupted or cannot be decoded.
    #[error("Corrupted object at {path}: {reason}")]
    CorruptedObject { path: PathBuf, reason: String },

    /// Content cannot be compared as line-based text.
    #[error("Not diffable: {reason}")]
    NotDiffable { reason: String },

    /// Invalid hash format or encoding.
    #[error("Invalid hash: {reason}")]
    InvalidHash { reason: String },

    /// Repository is missing or malformed.
    #[error("Invalid repository at {path}: {reason}")]
    InvalidRepository { path: PathBuf, reason: String },

    /// A repository already exists at the target location.
    #[error("Repository already exists at {path}")]
    RepositoryExists { path: PathBuf },

    /// Path does not live under the working tree.
    #[error("Path is outside the repository: {path}")]
    PathOutsideRepository { path: PathBuf },

    /// Path cannot be represented as an index key.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// HEAD moved between reading the parent and writing the new commit.
    #[error("HEAD moved concurrently: expected {expected}, found {found}")]
    ConcurrentUpdate { expected: String, found: String },

    /// Operation is outside what this engine implements.
    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    /// Unsupported algorithm.
    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },
}

impl Error {
    /// Create an ObjectNotFound error.
    pub fn object_not_found(hash: impl Into<String>) -> Self {
        Error::ObjectNotFound { hash: hash.into() }
    }

    /// Create a PathNotFound error.
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Error::PathNotFound { path: path.into() }
    }

    /// Create a CorruptHistory error.
    pub fn corrupt_history(reason: impl Into<String>) -> Self {
        Error::CorruptHistory {
            reason: reason.into(),
        }
    }

    /// Create a CorruptedObject error.
    pub fn corrupted_object(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptedObject {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotDiffable error.
    pub fn not_diffable(reason: impl Into<String>) -> Self {
        Error::NotDiffable {
            reason: reason.into(),
        }
    }

    /// Create an InvalidHash error.
    pub fn invalid_hash(reason: impl Into<String>) -> Self {
        Error::InvalidHash {
            reason: reason.into(),
        }
    }

    /// Create an InvalidRepository error.
    pub fn invalid_repository(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidRepository {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a RepositoryExists error.
    pub fn repository_exists(path: impl Into<PathBuf>) -> Self {
        Error::RepositoryExists { path: path.into() }
    }

    /// Create a PathOutsideRepository error.
    pub fn path_outside_repository(path: impl Into<PathBuf>) -> Self {
        Error::PathOutsideRepository { path: path.into() }
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConcurrentUpdate error.
    pub fn concurrent_update(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::ConcurrentUpdate {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an Unsupported error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Error::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create an UnsupportedAlgorithm error.
    pub fn unsupported_algorithm(algorithm: impl Into<String>) -> Self {
        Error::UnsupportedAlgorithm {
            algorithm: algorithm.into(),
        }
    }

    /// True for the "digest or path absent" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ObjectNotFound { .. } | Error::PathNotFound { .. }
        )
    }
}

// Additional From implementations for external error types

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}

impl From<ignore::Error> for Error {
    fn from(err: ignore::Error) -> Self {
        // ignore::Error can wrap an io::Error or be a path/glob error
        match err.io_error() {
            Some(io_err) => Error::Io {
                source: std::io::Error::new(io_err.kind(), io_err.to_string()),
            },
            None => Error::Io {
                source: std::io::Error::other(err.to_string()),
            },
        }
    }
}
