//! Error types for hub-api

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for hub-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or starting the server.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error, optionally tied to a path.
    #[error("I/O error{}: {source}", at_path(.path))]
    Io {
        /// Underlying error
        source: std::io::Error,
        /// Path involved, if any
        path: Option<PathBuf>,
    },

    /// Error from hub-storage
    #[error("Storage error: {0}")]
    Storage(#[from] hub_storage::Error),

    /// Error from hub-auth-local
    #[error("Auth error: {0}")]
    Auth(#[from] hub_auth_local::Error),

    /// Error from hub-media
    #[error("Media error: {0}")]
    Media(#[from] hub_media::MediaError),
}

fn at_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            source,
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source, path: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/etc/hub.toml",
        );
        assert_eq!(err.to_string(), "I/O error at /etc/hub.toml: gone");
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            Error::config("port must not be 0").to_string(),
            "Configuration error: port must not be 0"
        );
    }
}
