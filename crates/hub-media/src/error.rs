//! Error types for hub-media

use thiserror::Error;

/// Result type alias for hub-media operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Errors raised while checking or relaying uploads.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MediaError {
    /// A file broke the upload policy; nothing was sent.
    #[error("{file}: {reason}")]
    Rejected {
        /// Offending file name (empty for batch-level problems)
        file: String,
        /// What was wrong
        reason: String,
    },

    /// The host could not be reached.
    #[error("media host unreachable: {0}")]
    Transport(String),

    /// The host answered with an error status.
    #[error("media host returned {status}: {message}")]
    Host {
        /// HTTP status code
        status: u16,
        /// Host-supplied message
        message: String,
    },

    /// The host answered 2xx with a body we could not use.
    #[error("invalid media host response: {0}")]
    InvalidResponse(String),
}

impl MediaError {
    /// Creates a policy rejection.
    pub fn rejected(file: impl Into<String>, reason: impl Into<String>) -> Self {
        MediaError::Rejected {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Whether another attempt might succeed.
    ///
    /// Connection failures, 5xx answers and rate limiting are transient;
    /// everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            MediaError::Transport(_) => true,
            MediaError::Host { status, .. } => *status >= 500 || *status == 429,
            MediaError::Rejected { .. } | MediaError::InvalidResponse(_) => false,
        }
    }
}
