use index_janitor_core::Error as CoreError;
use thiserror::Error;

/// Storage-specific error types
///
/// The benign outcomes of an index drop are separate variants so callers can
/// match on them instead of inspecting server error codes.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("No secondary indexes present on {0}")]
    NoIndexesPresent(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(msg) => CoreError::connection(msg),
            StorageError::InvalidConfig(msg) => CoreError::config(msg),
            other => CoreError::storage(other.to_string()),
        }
    }
}
