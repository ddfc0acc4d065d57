//! Auth-specific error types.

use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid (not a bearer JWT).
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// JWT signature verification failed.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token audience doesn't match the configured audience.
    #[error("invalid audience")]
    InvalidAudience,

    /// Token issuer doesn't match the configured issuer.
    #[error("invalid issuer")]
    InvalidIssuer,

    /// The token is valid but its account no longer exists.
    #[error("unknown user")]
    UnknownUser,

    /// The validator itself failed.
    #[error("authentication backend error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether this error should result in a 401 (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Internal(_))
    }

    /// Message safe to return to clients.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Internal(_) => "authentication unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            unauthorized_response(&self.public_message())
        } else {
            log::error!("Authentication backend failure: {self}");
            let body = serde_json::json!({
                "error": {
                    "category": "internal",
                    "message": self.public_message(),
                }
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}

/// Build a 401 Unauthorized response with a `WWW-Authenticate` header.
pub(crate) fn unauthorized_response(message: &str) -> Response {
    let body = serde_json::json!({
        "error": {
            "category": "authentication",
            "message": message,
        }
    });

    let mut response = (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
    response.headers_mut().insert(
        http::header::WWW_AUTHENTICATE,
        http::HeaderValue::from_static(r#"Bearer realm="project-hub""#),
    );
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let e = AuthError::MissingToken;
        assert_eq!(e.to_string(), "missing authentication token");
    }

    #[test]
    fn test_is_client_error() {
        assert!(AuthError::MissingToken.is_client_error());
        assert!(AuthError::Expired.is_client_error());
        assert!(AuthError::UnknownUser.is_client_error());
        // Internal is a server-side issue, not a client error
        assert!(!AuthError::Internal("err".into()).is_client_error());
    }

    #[test]
    fn test_internal_message_is_generic() {
        let e = AuthError::Internal("key store offline".into());
        assert_eq!(e.public_message(), "authentication unavailable");
    }

    #[test]
    fn test_unauthorized_response_headers() {
        let resp = unauthorized_response("test error");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let www = resp.headers().get(http::header::WWW_AUTHENTICATE).unwrap();
        assert!(www.to_str().unwrap().starts_with("Bearer"));
    }

    #[test]
    fn test_internal_into_response_is_500() {
        let resp = AuthError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
