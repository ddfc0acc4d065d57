//! Error types for hub-cli

use thiserror::Error;

/// Result type alias for hub-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hub-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from hub-api (configuration, I/O, startup)
    #[error(transparent)]
    Api(#[from] hub_api::Error),

    /// Invalid account input
    #[error("Invalid input: {0}")]
    Core(#[from] hub_core::Error),

    /// Error from hub-storage
    #[error("Storage error: {0}")]
    Storage(#[from] hub_storage::Error),

    /// Password hashing failed
    #[error("Auth error: {0}")]
    Auth(#[from] hub_auth_local::Error),

    /// No account with this email
    #[error("No account registered for {0}")]
    UnknownAccount(String),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Api(hub_api::Error::config(message))
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Error::Api(hub_api::Error::io_with_path(source, path))
    }
}
