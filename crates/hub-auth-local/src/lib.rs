//! Local-account authentication for Project-HUB.
//!
//! Implements [`hub_auth::TokenValidator`] for accounts stored by the hub
//! itself:
//! - [`PasswordHasher`]: argon2id password hashing and verification
//! - [`LocalTokenIssuer`]: HS256 session tokens carrying id, email and role
//! - [`LocalTokenValidator`]: verifies those tokens for the auth middleware

mod error;
mod password;
mod token;

pub use error::{Error, Result};
pub use password::PasswordHasher;
pub use token::{Claims, DEFAULT_TOKEN_TTL, IssuedToken, LocalTokenIssuer, LocalTokenValidator, MAX_TOKEN_TTL, MIN_SECRET_LEN};
