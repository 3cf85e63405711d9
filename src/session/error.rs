//! Session store error types
//!
//! Errors raised by storage backends. Reads that fail are downgraded to
//! "absent" by the store; only writes surface these to callers.

use thiserror::Error;

/// Errors that can occur while touching persisted storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The storage medium refused the operation (quota, private mode, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
