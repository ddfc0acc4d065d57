//! Liveness probe.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

/// Health report.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `"ok"` when the server answers.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Storage backend in use.
    pub storage: &'static str,
    /// Media host in use.
    pub media: &'static str,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        service: "project-hub",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.store.backend_name(),
        media: state.media.name(),
    })
}
