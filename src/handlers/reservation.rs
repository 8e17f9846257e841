//! Stock reservation HTTP handlers

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::handlers::Caller;
use crate::reservation::{HoldRequest, HoldResponse};
use crate::state::AppState;

/// POST /api/holds - Reserve stock units against the caller's wallet
pub async fn create_hold(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<HoldRequest>,
) -> Result<Json<HoldResponse>, ApiError> {
    let response = state.reservation_service.hold(&caller, request).await?;
    Ok(Json(response))
}
