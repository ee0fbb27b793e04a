//! API module for the Grant interaction service

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer_count: Option<u64>,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint; ready once the roster store answers
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    match state.dispatcher.store().count_officers().await {
        Ok(count) => Json(ReadyResponse {
            ready: true,
            officer_count: Some(count),
        }),
        Err(e) => {
            error!(error = %e, "Readiness check failed");
            Json(ReadyResponse {
                ready: false,
                officer_count: None,
            })
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/interactions", post(handlers::handle_interaction))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
