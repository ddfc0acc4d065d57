//! Project submission, review and the public showcase.

use axum::Json;
use axum::extract::{Path, State};
use http::StatusCode;
use serde::Deserialize;

use hub_auth::{CurrentUser, MaybeUser};
use hub_core::access::{self, ListScope, strip_project_update};
use hub_core::{NewProject, Project, ProjectId, ProjectUpdate, ReviewStatus, Reviewable};

use super::ApiResult;
use super::proposals::StatusFilter;
use super::reviews::load_visible;
use crate::extract::{ApiJson, ApiQuery, Page, Pagination, parse_id};
use crate::{ApiError, AppState};

/// `?q=&tool=` showcase filters.
#[derive(Debug, Default, Deserialize)]
pub struct ShowcaseFilter {
    /// Free-text search over title, description and tools.
    pub q: Option<String>,
    /// Exact tool name.
    pub tool: Option<String>,
}

/// `POST /api/projects` (students)
///
/// The proposal must be the caller's and approved; its supervisor carries
/// over. One project per proposal.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    ApiJson(input): ApiJson<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    access::require(auth.role.can_submit(), "only students can submit projects")?;
    let input = input.normalize()?;

    let _guard = state.write_lock().await;
    let proposal = state.proposals.get(input.proposal).await?.ok_or_else(|| {
        ApiError::validation(Some("proposal".to_string()), "proposal does not exist")
    })?;
    access::require(
        proposal.student == auth.user_id,
        "projects can only be created from your own proposals",
    )?;
    if proposal.status != ReviewStatus::Approved {
        return Err(ApiError::conflict("the proposal has not been approved"));
    }
    if state.projects.find_one(|p| p.proposal == proposal.id).await?.is_some() {
        return Err(ApiError::conflict("a project already exists for this proposal"));
    }

    let project = Project::create(auth.user_id, proposal.supervisor, input);
    state.projects.insert(&project).await?;
    tracing::info!(project = %project.id, proposal = %proposal.id, "project submitted");
    Ok((StatusCode::CREATED, Json(project)))
}

/// `GET /api/projects`
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    ApiQuery(filter): ApiQuery<StatusFilter>,
    ApiQuery(paging): ApiQuery<Pagination>,
) -> ApiResult<Json<Page<Project>>> {
    let scope = ListScope::for_actor(&auth.actor());
    let mut projects = state
        .projects
        .find(|p| scope.includes(p) && filter.status.is_none_or(|s| p.status == s))
        .await?;
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(paging.apply(projects)))
}

/// `GET /api/projects/public`
///
/// Published, approved projects; open to anonymous visitors.
pub async fn showcase(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ShowcaseFilter>,
    ApiQuery(paging): ApiQuery<Pagination>,
) -> ApiResult<Json<Page<Project>>> {
    let q = filter.q.as_deref().unwrap_or_default();
    let tool = filter.tool.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let mut projects = state
        .projects
        .find(|p| p.is_public() && p.matches_query(q) && tool.is_none_or(|t| p.uses_tool(t)))
        .await?;
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(paging.apply(projects)))
}

/// `GET /api/projects/{id}`
pub async fn get(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    let id: ProjectId = parse_id("project", &id)?;
    let project = load_visible::<Project>(&state, user.actor().as_ref(), id).await?;
    Ok(Json(project))
}

/// `PATCH /api/projects/{id}`
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    let id: ProjectId = parse_id("project", &id)?;
    let actor = auth.actor();

    let _guard = state.write_lock().await;
    let mut project = load_visible::<Project>(&state, Some(&actor), id).await?;
    let update = strip_project_update(&actor, &project, update)?;
    project.apply_update(update, &actor)?;
    state.projects.save(&project).await?;
    Ok(Json(project))
}

/// `DELETE /api/projects/{id}`
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: ProjectId = parse_id("project", &id)?;
    let actor = auth.actor();

    let _guard = state.write_lock().await;
    let project = load_visible::<Project>(&state, Some(&actor), id).await?;
    access::require(
        access::can_delete_project(&actor, &project),
        "only the owner of an unapproved project or an admin can delete it",
    )?;

    state.projects.delete(id).await?;
    tracing::info!(project = %id, by = %auth.user_id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
