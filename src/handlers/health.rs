//! Health check HTTP handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /health - Service and database liveness
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match db::check_health(&state.pool).await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!("Database unreachable during health check: {}", e);
            "down"
        }
    };

    Json(HealthResponse {
        status: "ok",
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}
