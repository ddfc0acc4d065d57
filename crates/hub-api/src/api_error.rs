//! The JSON error contract.
//!
//! Every failure leaves the API as
//! `{"error": {"category": ..., "message": ..., "field"?: ...}}`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use hub_auth::AuthError;
use hub_media::MediaError;

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    category: &'static str,
    message: String,
    field: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.category, self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn new(status: StatusCode, category: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            category,
            message: message.into(),
            field: None,
        }
    }

    /// 401: missing or bad credentials.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication", message)
    }

    /// 403: signed in but not allowed.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    /// 404 for a document kind and id.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", format!("{kind} not found: {id}"))
    }

    /// 404 for an unknown route.
    pub fn no_route() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", "no such route")
    }

    /// 409: the request clashes with current state.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    /// 422 naming the offending field.
    pub fn validation(field: Option<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation", message)
        }
    }

    /// 400/413: the request body itself is unusable.
    pub fn payload(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, "payload", message)
    }

    /// 502: the media host failed.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "upstream", message)
    }

    /// 500. The detail is logged, the client sees a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "internal server error",
        )
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Error category.
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "category": self.category,
            "message": self.message,
        });
        if let Some(field) = self.field {
            error["field"] = json!(field);
        }
        let mut response = (self.status, Json(json!({ "error": error }))).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                http::header::WWW_AUTHENTICATE,
                http::HeaderValue::from_static(r#"Bearer realm="project-hub""#),
            );
        }
        response
    }
}

impl From<hub_core::Error> for ApiError {
    fn from(err: hub_core::Error) -> Self {
        use hub_core::Error;
        match err {
            Error::NotFound { kind, id } => ApiError::not_found(kind, id),
            Error::Validation { field, message } => ApiError::validation(field, message),
            Error::Forbidden(message) => ApiError::forbidden(message),
            Error::Conflict(message) => ApiError::conflict(message),
            Error::Unauthenticated => ApiError::unauthenticated("authentication required"),
            other => ApiError::internal(other),
        }
    }
}

impl From<hub_storage::Error> for ApiError {
    fn from(err: hub_storage::Error) -> Self {
        use hub_storage::Error;
        match err {
            Error::NotFound { kind, id } => ApiError::not_found(kind, id),
            Error::EmailTaken(_) => ApiError::conflict("email is already registered"),
            Error::Conflict { collection, id } => {
                ApiError::conflict(format!("{collection}/{id} already exists"))
            }
            other => ApiError::internal(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_client_error() {
            ApiError::unauthenticated(err.public_message())
        } else {
            ApiError::internal(err)
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Rejected { .. } => ApiError::payload(StatusCode::BAD_REQUEST, err.to_string()),
            other => {
                tracing::warn!(error = %other, "media host failure");
                ApiError::upstream(other.to_string())
            }
        }
    }
}

impl From<hub_auth_local::Error> for ApiError {
    fn from(err: hub_auth_local::Error) -> Self {
        ApiError::internal(err)
    }
}
