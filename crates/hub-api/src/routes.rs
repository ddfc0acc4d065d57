//! REST route table.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};

use hub_auth::AuthLayer;
use hub_core::{Project, Proposal};

use crate::handlers::{auth, health, projects, proposals, reviews, uploads, users};
use crate::{ApiError, AppState};

/// Builds the API router.
///
/// Registration, login and the health probe take no token. Everything else
/// sits behind an optional auth layer: a valid bearer token attaches the
/// user, a bad one is rejected, and handlers that need a user ask for
/// `CurrentUser`.
pub fn router(state: AppState) -> Router {
    let open = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let authed = Router::new()
        .route("/api/auth/me", get(auth::me))
        .merge(user_routes())
        .merge(proposal_routes())
        .merge(project_routes())
        .route(
            "/api/uploads",
            post(uploads::upload).layer(DefaultBodyLimit::max(state.body_limit)),
        )
        .route_layer(AuthLayer::optional(
            state.validator.clone(),
            state.auth_config.clone(),
        ));

    open.merge(authed)
        .fallback(|| async { ApiError::no_route() })
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/teachers", get(users::teachers))
        .route(
            "/api/users/{id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
}

fn proposal_routes() -> Router<AppState> {
    Router::new()
        .route("/api/proposals", get(proposals::list).post(proposals::create))
        .route(
            "/api/proposals/{id}",
            get(proposals::get)
                .patch(proposals::update)
                .delete(proposals::delete),
        )
        .route(
            "/api/proposals/{id}/feedback",
            post(reviews::add_feedback::<Proposal>),
        )
        .route(
            "/api/proposals/{id}/feedback/{feedback_id}",
            delete(reviews::remove_feedback::<Proposal>),
        )
        .route(
            "/api/proposals/{id}/comments",
            post(reviews::add_comment::<Proposal>),
        )
        .route(
            "/api/proposals/{id}/comments/{comment_id}",
            delete(reviews::remove_comment::<Proposal>),
        )
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(projects::list).post(projects::create))
        .route("/api/projects/public", get(projects::showcase))
        .route(
            "/api/projects/{id}",
            get(projects::get)
                .patch(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/api/projects/{id}/feedback",
            post(reviews::add_feedback::<Project>),
        )
        .route(
            "/api/projects/{id}/feedback/{feedback_id}",
            delete(reviews::remove_feedback::<Project>),
        )
        .route(
            "/api/projects/{id}/comments",
            post(reviews::add_comment::<Project>),
        )
        .route(
            "/api/projects/{id}/comments/{comment_id}",
            delete(reviews::remove_comment::<Project>),
        )
}
