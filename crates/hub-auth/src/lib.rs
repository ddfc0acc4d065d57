//! Authentication primitives for Project-HUB.
//!
//! Provides:
//! - [`AuthenticatedUser`]: identity extracted from a validated token
//! - [`TokenValidator`]: trait for async token validation (one per provider)
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`CurrentUser`] / [`MaybeUser`]: axum extractors for handlers
//! - [`AuthConfig`]: expected issuer and audience
//! - [`AuthError`]: auth-specific error types

mod error;
mod middleware;
mod user;

pub use error::AuthError;
pub use middleware::{AuthLayer, AuthService};
pub use user::{AuthenticatedUser, CurrentUser, MaybeUser, user_from_parts};

use std::future::Future;
use std::pin::Pin;

/// Default token issuer.
pub const DEFAULT_ISSUER: &str = "project-hub";

/// Default token audience.
pub const DEFAULT_AUDIENCE: &str = "project-hub-api";

/// Configuration shared by token issuers and validators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }
}

/// Boxed future returned by [`TokenValidator::validate`].
pub type ValidateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + 'a>>;

/// Trait for validating tokens and extracting user identity.
///
/// The middleware calls `validate()` with the bearer token and stores the
/// authenticated user in request extensions on success.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate<'a>(&'a self, token: &'a str, config: &'a AuthConfig) -> ValidateFuture<'a>;
}
