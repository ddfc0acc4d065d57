//! Session tokens checked against stored accounts.
//!
//! A signature alone only proves who the user was when the token was
//! issued. [`AccountValidator`] reloads the account on every request so a
//! deleted user is refused and a role change applies immediately.

use hub_auth::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator, ValidateFuture};
use hub_auth_local::LocalTokenValidator;
use hub_core::User;
use hub_storage::Repository;

/// Validates a session token, then resolves its subject to the stored
/// account.
#[derive(Clone)]
pub struct AccountValidator {
    tokens: LocalTokenValidator,
    users: Repository<User>,
}

impl AccountValidator {
    /// Wraps `tokens` with account lookups in `users`.
    pub fn new(tokens: LocalTokenValidator, users: Repository<User>) -> Self {
        Self { tokens, users }
    }
}

impl TokenValidator for AccountValidator {
    fn validate<'a>(&'a self, token: &'a str, config: &'a AuthConfig) -> ValidateFuture<'a> {
        Box::pin(async move {
            let claims = self.tokens.validate(token, config).await?;
            let user = self
                .users
                .get(claims.user_id)
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?
                .ok_or(AuthError::UnknownUser)?;
            if user.role != claims.role {
                tracing::debug!(user = %user.id, role = %user.role, "role changed since sign-in");
            }
            Ok(AuthenticatedUser {
                user_id: user.id,
                email: user.email,
                role: user.role,
            })
        })
    }
}
