//! Incident storage errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage not initialized")]
    NotInitialized,

    #[error("Incident for check '{0}' already exists")]
    DuplicateKey(String),

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
