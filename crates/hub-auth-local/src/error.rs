//! Error types for hub-auth-local

use thiserror::Error;

/// Result type alias for hub-auth-local operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while hashing passwords or issuing tokens.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The signing secret is too short to be safe.
    #[error("JWT secret must be at least {min} bytes (got {len})")]
    SecretTooShort {
        /// Actual length
        len: usize,
        /// Required length
        min: usize,
    },

    /// The session lifetime is out of range.
    #[error("token lifetime must be at most {max_days} days")]
    TokenLifetime {
        /// Longest accepted lifetime, in days
        max_days: i64,
    },

    /// Hashing parameters or the hasher itself failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Token encoding failed.
    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
