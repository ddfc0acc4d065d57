//! Tower authentication middleware.
//!
//! `AuthLayer` and `AuthService` wrap any inner service with bearer token
//! validation. Generic over `TokenValidator`, so any identity provider
//! plugs in.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::Request;
use tower::{Layer, Service};

use crate::error::unauthorized_response;
use crate::{AuthConfig, AuthError, TokenValidator};

/// Whether a request may proceed without credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Required,
    Optional,
}

/// Tower `Layer` that wraps services with token authentication.
pub struct AuthLayer<V: TokenValidator> {
    validator: Arc<V>,
    config: AuthConfig,
    mode: Mode,
}

impl<V: TokenValidator> Clone for AuthLayer<V> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

impl<V: TokenValidator> AuthLayer<V> {
    /// Layer that rejects requests without a valid bearer token.
    pub fn new(validator: Arc<V>, config: AuthConfig) -> Self {
        Self {
            validator,
            config,
            mode: Mode::Required,
        }
    }

    /// Layer that lets requests without an `Authorization` header through
    /// anonymously. A header that is present must still be valid.
    pub fn optional(validator: Arc<V>, config: AuthConfig) -> Self {
        Self {
            validator,
            config,
            mode: Mode::Optional,
        }
    }
}

impl<V: TokenValidator, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
///
/// On successful validation, inserts `AuthenticatedUser` into request
/// extensions where it's available to downstream handlers.
pub struct AuthService<V: TokenValidator, S> {
    inner: S,
    validator: Arc<V>,
    config: AuthConfig,
    mode: Mode,
}

impl<V: TokenValidator, S: Clone> Clone for AuthService<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let validator = self.validator.clone();
        let config = self.config.clone();
        let mode = self.mode;

        Box::pin(async move {
            let token = match extract_bearer_token(&req).map(|t| t.map(str::to_string)) {
                Ok(Some(t)) => t,
                Ok(None) if mode == Mode::Optional => {
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    return Ok(resp.into_response());
                }
                Ok(None) => return Ok(unauthorized_response(&AuthError::MissingToken.to_string())),
                Err(err) => {
                    log::warn!("Authentication failed: {err}");
                    return Ok(err.into_response());
                }
            };

            match validator.validate(&token, &config).await {
                Ok(user) => {
                    log::debug!("Authenticated {} as {}", user.email, user.role);
                    req.extensions_mut().insert(user);
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    Ok(resp.into_response())
                }
                Err(auth_err) => {
                    log::warn!("Authentication failed: {auth_err}");
                    Ok(auth_err.into_response())
                }
            }
        })
    }
}

/// Extract the bearer token from the Authorization header.
///
/// `Ok(None)` means no header at all; a header with another scheme or no
/// token is an error.
fn extract_bearer_token(req: &Request<Body>) -> Result<Option<&str>, AuthError> {
    let Some(value) = req.headers().get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("authorization header is not ASCII".into()))?;
    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(Some(token)),
        _ => Err(AuthError::InvalidFormat("expected a bearer token".into())),
    }
}
