//! Registration, login and the current profile.

use axum::Json;
use axum::extract::State;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use hub_auth::CurrentUser;
use hub_auth_local::IssuedToken;
use hub_core::{NewUser, Role, User, UserProfile};

use super::ApiResult;
use crate::extract::ApiJson;
use crate::{ApiError, AppState};

/// Token plus the signed-in profile.
#[derive(Debug, Serialize)]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// Token expiry.
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// The account.
    pub user: UserProfile,
}

impl Session {
    fn new(issued: IssuedToken, user: &User) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.profile(),
        }
    }
}

/// Login body.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

const BAD_CREDENTIALS: &str = "invalid email or password";

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let input = input.normalize()?;
    let role = input.role.unwrap_or(Role::Student);
    if !role.self_assignable() {
        return Err(ApiError::forbidden(format!("the {role} role cannot be self-assigned")));
    }

    let hash = state.hash_password(input.password.clone()).await?;
    let user = User::create(input, hash, role);

    state.emails.claim(&user.email, user.id).await?;
    if let Err(err) = state.users.insert(&user).await {
        state.emails.release(&user.email).await?;
        return Err(err.into());
    }
    tracing::info!(user = %user.id, role = %role, "registered account");

    let issued = state.tokens.issue(&user)?;
    Ok((StatusCode::CREATED, Json(Session::new(issued, &user))))
}

/// `POST /api/auth/login`
///
/// Unknown emails and wrong passwords get the same answer.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> ApiResult<Json<Session>> {
    let user = match state.emails.lookup(&input.email).await? {
        Some(id) => state.users.get(id).await?,
        None => None,
    };
    let Some(user) = user else {
        tracing::debug!("login for unknown email");
        return Err(ApiError::unauthenticated(BAD_CREDENTIALS));
    };

    if !state
        .verify_password(input.password, user.password_hash.clone())
        .await?
    {
        tracing::warn!(user = %user.id, "failed login");
        return Err(ApiError::unauthenticated(BAD_CREDENTIALS));
    }

    let issued = state.tokens.issue(&user)?;
    Ok(Json(Session::new(issued, &user)))
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
) -> ApiResult<Json<UserProfile>> {
    let user = state.current_user(&auth).await?;
    Ok(Json(user.profile()))
}
