//! HTTP route handlers for the skill.
//!
//! # Route Structure
//!
//! ```text
//! POST /webhook        - Voice platform conversation turn
//! GET  /health         - Liveness check
//! GET  /health/ready   - Readiness check with live session count
//! ```

pub mod health;
pub mod webhook;

use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create all routes for the skill.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/webhook", post(webhook::webhook))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Routes with request tracing and request ids, bound to `state`.
///
/// Sentry layers are added by the binary so tests can run without a hub.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
