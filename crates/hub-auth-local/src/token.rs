//! HS256 session tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use hub_auth::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator, ValidateFuture};
use hub_core::{Role, User, UserId};

use crate::{Error, Result};

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default session lifetime (7 days).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::days(7);

/// Longest accepted session lifetime (one year).
pub const MAX_TOKEN_TTL: Duration = Duration::days(365);

fn lifetime_error() -> Error {
    Error::TokenLifetime {
        max_days: MAX_TOKEN_TTL.num_days(),
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Email at issue time.
    pub email: String,
    /// Role at issue time.
    pub role: Role,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// A freshly signed token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// The compact JWT.
    pub token: String,
    /// When it stops being accepted.
    pub expires_at: DateTime<Utc>,
}

fn check_secret(secret: &[u8]) -> Result<()> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(Error::SecretTooShort {
            len: secret.len(),
            min: MIN_SECRET_LEN,
        });
    }
    Ok(())
}

/// Signs session tokens for signed-in users.
#[derive(Clone)]
pub struct LocalTokenIssuer {
    key: EncodingKey,
    config: AuthConfig,
    ttl: Duration,
}

impl LocalTokenIssuer {
    /// Creates an issuer. Fails if `secret` is shorter than [`MIN_SECRET_LEN`]
    /// or `ttl` exceeds [`MAX_TOKEN_TTL`].
    pub fn new(secret: &[u8], config: AuthConfig, ttl: Duration) -> Result<Self> {
        check_secret(secret)?;
        if ttl > MAX_TOKEN_TTL {
            return Err(lifetime_error());
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret),
            config,
            ttl,
        })
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `user`.
    pub fn issue(&self, user: &User) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(lifetime_error)?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)?;
        log::debug!("Issued session token for {}", user.email);
        Ok(IssuedToken { token, expires_at })
    }
}

/// Validates tokens signed by a [`LocalTokenIssuer`] with the same secret.
#[derive(Clone)]
pub struct LocalTokenValidator {
    key: DecodingKey,
}

impl LocalTokenValidator {
    /// Creates a validator. Fails if `secret` is shorter than [`MIN_SECRET_LEN`].
    pub fn new(secret: &[u8]) -> Result<Self> {
        check_secret(secret)?;
        Ok(Self {
            key: DecodingKey::from_secret(secret),
        })
    }

    /// Decodes and checks a token, returning its claims.
    pub fn decode(&self, token: &str, config: &AuthConfig) -> std::result::Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        decode::<Claims>(token, &self.key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature(e.to_string()),
                _ => AuthError::InvalidFormat(e.to_string()),
            })
    }

    fn authenticate(&self, token: &str, config: &AuthConfig) -> std::result::Result<AuthenticatedUser, AuthError> {
        let claims = self.decode(token, config)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidFormat("subject is not a user id".to_string()))?;
        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

impl TokenValidator for LocalTokenValidator {
    fn validate<'a>(&'a self, token: &'a str, config: &'a AuthConfig) -> ValidateFuture<'a> {
        Box::pin(async move { self.authenticate(token, config) })
    }
}
