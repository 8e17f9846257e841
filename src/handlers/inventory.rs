//! Catalog and stock administration HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::handlers::{Caller, ProviderCaller};
use crate::inventory::{
    ArchiveStatusRequest, AvailabilityQuery, AvailabilityResponse, CreateArchiveRequest,
    CreatePlanRequest,
};
use crate::models::{Archive, Plan};
use crate::state::AppState;

/// POST /api/plans - Create a catalog plan
pub async fn create_plan(
    State(state): State<AppState>,
    ProviderCaller(_caller): ProviderCaller,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Plan>), ApiError> {
    request.validate()?;
    let plan = state.inventory_service.create_plan(request).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// POST /api/archives - Import an archive batch with units and pricing
pub async fn create_archive(
    State(state): State<AppState>,
    ProviderCaller(caller): ProviderCaller,
    Json(request): Json<CreateArchiveRequest>,
) -> Result<(StatusCode, Json<Archive>), ApiError> {
    request.validate()?;
    let archive = state
        .inventory_service
        .create_archive(&caller, request)
        .await?;
    Ok((StatusCode::CREATED, Json(archive)))
}

/// POST /api/archives/:id/status - Activate or deactivate an archive
pub async fn set_archive_status(
    State(state): State<AppState>,
    ProviderCaller(_caller): ProviderCaller,
    Path(archive_id): Path<Uuid>,
    Json(request): Json<ArchiveStatusRequest>,
) -> Result<Json<Archive>, ApiError> {
    let archive = state
        .inventory_service
        .set_archive_status(archive_id, request.active)
        .await?;
    Ok(Json(archive))
}

/// DELETE /api/archives/:id - Delete an archive no sale has touched
pub async fn delete_archive(
    State(state): State<AppState>,
    ProviderCaller(_caller): ProviderCaller,
    Path(archive_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.inventory_service.delete_archive(archive_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/stock/availability - Ready stock count for a plan
pub async fn availability(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let available = state.inventory_service.availability(query.plan_id).await?;
    Ok(Json(AvailabilityResponse {
        plan_id: query.plan_id,
        available,
    }))
}
