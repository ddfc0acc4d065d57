//! Authenticated user identity and axum extractors.

use axum::extract::FromRequestParts;
use http::request::Parts;

use hub_core::{Actor, Role, UserId};

use crate::AuthError;

/// An authenticated user identity, extracted from a validated token.
///
/// Stored in HTTP request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The account id (the `sub` claim).
    pub user_id: UserId,
    /// The user's email address.
    pub email: String,
    /// The user's role.
    pub role: Role,
}

impl AuthenticatedUser {
    /// The identity as seen by the access policy.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}

/// Extractor for routes that need a signed-in user. Rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingToken)
    }
}

/// Extractor for routes that also serve anonymous visitors.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl MaybeUser {
    /// The policy identity, if signed in.
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(AuthenticatedUser::actor)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_parts(parts).cloned()))
    }
}
