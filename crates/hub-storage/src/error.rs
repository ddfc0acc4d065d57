//! Error types for hub-storage

use thiserror::Error;

/// Result type alias for hub-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hub-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A document with this id already exists.
    #[error("document already exists: {collection}/{id}")]
    Conflict {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// A required document is missing.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Document kind
        kind: &'static str,
        /// Document id
        id: String,
    },

    /// The email address is already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// Stored bytes could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage backend failed.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// I/O error while preparing the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps any backend error.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Error::Backend(err.to_string())
    }
}
