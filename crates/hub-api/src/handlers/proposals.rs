//! Proposal submission and review workflow.

use axum::Json;
use axum::extract::{Path, State};
use http::StatusCode;
use serde::Deserialize;

use hub_auth::CurrentUser;
use hub_core::access::{self, ListScope, strip_proposal_update};
use hub_core::{NewProposal, Proposal, ProposalId, ProposalUpdate, ReviewStatus, Role, UserId};

use super::ApiResult;
use super::reviews::load_visible;
use crate::extract::{ApiJson, ApiQuery, Page, Pagination, parse_id};
use crate::{ApiError, AppState};

/// `?status=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    /// Only this status.
    pub status: Option<ReviewStatus>,
}

/// Fails unless `id` is an existing teacher account.
pub(crate) async fn require_teacher(state: &AppState, id: UserId) -> ApiResult<()> {
    match state.users.get(id).await? {
        Some(user) if user.role == Role::Teacher => Ok(()),
        _ => Err(ApiError::validation(
            Some("supervisor".to_string()),
            "must be an existing teacher",
        )),
    }
}

/// `POST /api/proposals` (students)
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    ApiJson(input): ApiJson<NewProposal>,
) -> ApiResult<(StatusCode, Json<Proposal>)> {
    access::require(auth.role.can_submit(), "only students can submit proposals")?;
    let input = input.normalize()?;
    require_teacher(&state, input.supervisor).await?;

    let proposal = Proposal::create(auth.user_id, input);
    state.proposals.insert(&proposal).await?;
    tracing::info!(proposal = %proposal.id, student = %auth.user_id, "proposal submitted");
    Ok((StatusCode::CREATED, Json(proposal)))
}

/// `GET /api/proposals`
///
/// Students see their own, teachers the ones they supervise, admins all.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    ApiQuery(filter): ApiQuery<StatusFilter>,
    ApiQuery(paging): ApiQuery<Pagination>,
) -> ApiResult<Json<Page<Proposal>>> {
    let scope = ListScope::for_actor(&auth.actor());
    let mut proposals = state
        .proposals
        .find(|p| scope.includes(p) && filter.status.is_none_or(|s| p.status == s))
        .await?;
    proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(paging.apply(proposals)))
}

/// `GET /api/proposals/{id}`
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Proposal>> {
    let id: ProposalId = parse_id("proposal", &id)?;
    let proposal = load_visible::<Proposal>(&state, Some(&auth.actor()), id).await?;
    Ok(Json(proposal))
}

/// `PATCH /api/proposals/{id}`
///
/// Owners edit content while the proposal is editable, supervisors move
/// the status, admins do both.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ProposalUpdate>,
) -> ApiResult<Json<Proposal>> {
    let id: ProposalId = parse_id("proposal", &id)?;
    let actor = auth.actor();

    let _guard = state.write_lock().await;
    let mut proposal = load_visible::<Proposal>(&state, Some(&actor), id).await?;
    let update = strip_proposal_update(&actor, &proposal, update)?;
    if let Some(supervisor) = update.supervisor {
        require_teacher(&state, supervisor).await?;
    }

    proposal.apply_update(update, &actor)?;
    state.proposals.save(&proposal).await?;
    Ok(Json(proposal))
}

/// `DELETE /api/proposals/{id}`
///
/// A proposal that already has a project is kept.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: ProposalId = parse_id("proposal", &id)?;
    let actor = auth.actor();

    let _guard = state.write_lock().await;
    let proposal = load_visible::<Proposal>(&state, Some(&actor), id).await?;
    access::require(
        access::can_delete_proposal(&actor, &proposal),
        "only the owner of a pending proposal or an admin can delete it",
    )?;
    if state.projects.find_one(|p| p.proposal == id).await?.is_some() {
        return Err(ApiError::conflict("a project already references this proposal"));
    }

    state.proposals.delete(id).await?;
    tracing::info!(proposal = %id, by = %auth.user_id, "proposal deleted");
    Ok(StatusCode::NO_CONTENT)
}
