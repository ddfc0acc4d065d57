//! Account administration and profiles.

use axum::Json;
use axum::extract::{Path, State};
use http::StatusCode;
use serde::Deserialize;

use hub_auth::CurrentUser;
use hub_core::access::{self, strip_user_update};
use hub_core::user::validate_password;
use hub_core::{Role, UserId, UserProfile, UserUpdate};

use super::ApiResult;
use crate::extract::{ApiJson, ApiQuery, Page, Pagination, parse_id};
use crate::{ApiError, AppState};

/// `?role=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    /// Only this role.
    pub role: Option<Role>,
}

/// `GET /api/users` (admins)
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    ApiQuery(filter): ApiQuery<UserFilter>,
    ApiQuery(paging): ApiQuery<Pagination>,
) -> ApiResult<Json<Page<UserProfile>>> {
    access::require(auth.role.is_admin(), "only admins can list accounts")?;
    let mut users = state
        .users
        .find(|u| filter.role.is_none_or(|role| u.role == role))
        .await?;
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let profiles = users.iter().map(|u| u.profile()).collect();
    Ok(Json(paging.apply(profiles)))
}

/// `GET /api/users/teachers`
///
/// Every teacher, by name, for picking a supervisor.
pub async fn teachers(
    State(state): State<AppState>,
    CurrentUser(_auth): CurrentUser,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let mut teachers = state.users.find(|u| u.role == Role::Teacher).await?;
    teachers.sort_by_key(|u| u.name.to_lowercase());
    Ok(Json(teachers.iter().map(|u| u.profile()).collect()))
}

/// `GET /api/users/{id}`
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_auth): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let id: UserId = parse_id("user", &id)?;
    let user = state.users.require(id).await?;
    Ok(Json(user.profile()))
}

/// `PATCH /api/users/{id}`
///
/// Fields the caller may not change are dropped. Changing your own
/// password requires the current one.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<UserProfile>> {
    let id: UserId = parse_id("user", &id)?;
    let actor = auth.actor();

    let _guard = state.write_lock().await;
    let mut user = state.users.require(id).await?;
    let update = strip_user_update(&actor, &user, update)?;

    let new_hash = match &update.password {
        Some(password) => {
            validate_password("password", password)?;
            let current = update.current_password.clone().unwrap_or_default();
            if !state
                .verify_password(current, user.password_hash.clone())
                .await?
            {
                return Err(ApiError::validation(
                    Some("current_password".to_string()),
                    "does not match",
                ));
            }
            Some(state.hash_password(password.clone()).await?)
        }
        None => None,
    };

    user.apply_update(&update)?;
    if let Some(hash) = new_hash {
        user.set_password_hash(hash);
        tracing::info!(user = %user.id, "password changed");
    }
    state.users.save(&user).await?;
    Ok(Json(user.profile()))
}

/// `DELETE /api/users/{id}` (admins, not themselves)
///
/// Documents the account owns are kept.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: UserId = parse_id("user", &id)?;
    access::require(auth.role.is_admin(), "only admins can delete accounts")?;
    if id == auth.user_id {
        return Err(ApiError::conflict("admins cannot delete their own account"));
    }

    let _guard = state.write_lock().await;
    let user = state.users.require(id).await?;
    state.users.delete(id).await?;
    state.emails.release(&user.email).await?;
    tracing::info!(user = %id, by = %auth.user_id, "deleted account");
    Ok(StatusCode::NO_CONTENT)
}
