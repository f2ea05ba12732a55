use thiserror::Error;

/// Result type for index janitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for index janitor operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// Storage related errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether this error happened before any collection could be processed
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
