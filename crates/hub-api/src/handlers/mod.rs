//! Route handlers.

pub mod auth;
pub mod health;
pub mod projects;
pub mod proposals;
pub mod reviews;
pub mod uploads;
pub mod users;

use crate::ApiError;

/// Handler result.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
