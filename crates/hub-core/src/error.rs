//! Error types for hub-core.

/// Result type alias for hub-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by domain rules.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A referenced document does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Document kind ("user", "proposal", ...)
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Input failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation, when known
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The actor is authenticated but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation needs an authenticated actor.
    #[error("authentication required")]
    Unauthenticated,

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

impl Error {
    /// Creates a not-found error for a document kind.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Creates a validation error without a field.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Error::Forbidden(message.into())
    }

    /// Creates a conflict error.
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Error::Conflict(message.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns `true` if the error was caused by the caller's input or
    /// permissions rather than by the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Serialization(_) | Error::Config { .. })
    }
}
