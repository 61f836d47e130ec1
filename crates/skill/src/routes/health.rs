//! Liveness and readiness probes.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub sessions: u64,
}

/// Readiness health check endpoint.
///
/// Sessions are process-local, so the only thing worth reporting is how many
/// are live.
pub async fn readiness(State(state): State<AppState>) -> Json<Readiness> {
    Json(Readiness {
        status: "ok",
        sessions: state.sessions().len().await,
    })
}
