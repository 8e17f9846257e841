//! Settlement and payment HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::Caller;
use crate::models::Payment;
use crate::settlement::{ListPaymentsQuery, SettleRequest, SettleResponse};
use crate::state::AppState;

/// POST /api/settlements - Convert a hold into a paid sale
pub async fn create_settlement(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<SettleRequest>,
) -> Result<Json<SettleResponse>, ApiError> {
    let response = state.settlement_service.settle(&caller, request).await?;
    Ok(Json(response))
}

/// GET /api/payments - List the caller's payments, most recent first
pub async fn list_payments(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = state
        .settlement_service
        .list_payments(&caller, query.limit)
        .await?;
    Ok(Json(payments))
}

/// GET /api/payments/:id - Fetch one payment receipt
pub async fn get_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state
        .settlement_service
        .get_payment(&caller, payment_id)
        .await?;
    Ok(Json(payment))
}

/// POST /api/payments/:id/activate - Mark a delivered card as activated
pub async fn activate_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state
        .settlement_service
        .activate_payment(&caller, payment_id)
        .await?;
    Ok(Json(payment))
}
