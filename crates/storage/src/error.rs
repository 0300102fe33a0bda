//! Storage error types.

use thiserror::Error;

/// Errors that can occur while reading or writing the local store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for storage results.
pub type Result<T> = std::result::Result<T, StorageError>;
