//! Feedback and comments, shared by proposals and projects.
//!
//! The handlers here are generic over [`Reviewed`] and mounted once per
//! document type, e.g. `post(reviews::add_feedback::<Proposal>)`.

use std::fmt::Display;
use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use http::StatusCode;

use hub_auth::CurrentUser;
use hub_core::access::{self, Actor};
use hub_core::{
    Comment, CommentId, Feedback, FeedbackId, NewComment, NewFeedback, Project, ProjectId,
    Proposal, ProposalId, Reviewable,
};
use hub_storage::{Document, Repository};

use super::ApiResult;
use crate::extract::{ApiJson, parse_id};
use crate::{ApiError, AppState};

/// A stored document that carries feedback and comments.
pub trait Reviewed: Document + Reviewable {
    /// Typed id.
    type Id: FromStr + Display + Copy + Send + Sync + 'static;

    /// The repository holding this type.
    fn repository(state: &AppState) -> &Repository<Self>;
}

impl Reviewed for Proposal {
    type Id = ProposalId;

    fn repository(state: &AppState) -> &Repository<Self> {
        &state.proposals
    }
}

impl Reviewed for Project {
    type Id = ProjectId;

    fn repository(state: &AppState) -> &Repository<Self> {
        &state.projects
    }
}

fn kind<D: Reviewed>() -> &'static str {
    <D as Document>::KIND
}

/// Loads a document the actor may see. Invisible documents are reported
/// as missing.
pub(crate) async fn load_visible<D: Reviewed>(
    state: &AppState,
    actor: Option<&Actor>,
    id: D::Id,
) -> ApiResult<D> {
    let doc = D::repository(state).require(id).await?;
    if !access::can_view(actor, &doc) {
        return Err(ApiError::not_found(kind::<D>(), id));
    }
    Ok(doc)
}

/// `POST /api/{proposals,projects}/{id}/feedback`
pub async fn add_feedback<D: Reviewed>(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<NewFeedback>,
) -> ApiResult<(StatusCode, Json<Feedback>)> {
    let id: D::Id = parse_id(kind::<D>(), &id)?;
    let actor = auth.actor();
    let input = input.normalize()?;
    let reviewer = state.current_user(&auth).await?;

    let _guard = state.write_lock().await;
    let mut doc = load_visible::<D>(&state, Some(&actor), id).await?;
    access::require(
        access::can_review(&actor, &doc),
        "only the supervisor or an admin can leave feedback",
    )?;

    let feedback = Feedback::new(&reviewer, input);
    doc.add_feedback(feedback.clone());
    D::repository(&state).save(&doc).await?;
    tracing::info!(kind = kind::<D>(), %id, reviewer = %reviewer.id, "feedback added");
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// `DELETE /api/{proposals,projects}/{id}/feedback/{feedback_id}`
pub async fn remove_feedback<D: Reviewed>(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path((id, feedback_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let id: D::Id = parse_id(kind::<D>(), &id)?;
    let feedback_id: FeedbackId = parse_id("feedback", &feedback_id)?;
    let actor = auth.actor();

    let _guard = state.write_lock().await;
    let mut doc = load_visible::<D>(&state, Some(&actor), id).await?;
    let feedback = doc
        .feedback()
        .iter()
        .find(|f| f.id == feedback_id)
        .ok_or_else(|| ApiError::not_found("feedback", feedback_id))?;
    access::require(
        access::can_remove_feedback(&actor, feedback),
        "only the reviewer or an admin can remove feedback",
    )?;

    doc.remove_feedback(feedback_id);
    D::repository(&state).save(&doc).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/{proposals,projects}/{id}/comments`
pub async fn add_comment<D: Reviewed>(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<NewComment>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let id: D::Id = parse_id(kind::<D>(), &id)?;
    let actor = auth.actor();
    let input = input.normalize()?;
    let author = state.current_user(&auth).await?;

    let _guard = state.write_lock().await;
    let mut doc = load_visible::<D>(&state, Some(&actor), id).await?;
    access::require(access::can_comment(Some(&actor), &doc), "cannot comment here")?;

    let comment = Comment::new(&author, input);
    doc.add_comment(comment.clone());
    D::repository(&state).save(&doc).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `DELETE /api/{proposals,projects}/{id}/comments/{comment_id}`
pub async fn remove_comment<D: Reviewed>(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let id: D::Id = parse_id(kind::<D>(), &id)?;
    let comment_id: CommentId = parse_id("comment", &comment_id)?;
    let actor = auth.actor();

    let _guard = state.write_lock().await;
    let mut doc = load_visible::<D>(&state, Some(&actor), id).await?;
    let comment = doc
        .comments()
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| ApiError::not_found("comment", comment_id))?;
    access::require(
        access::can_remove_comment(&actor, comment),
        "only the author or an admin can remove a comment",
    )?;

    doc.remove_comment(comment_id);
    D::repository(&state).save(&doc).await?;
    Ok(StatusCode::NO_CONTENT)
}
