//! Wallet funding HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::funding::{
    FundRequest, FundResponse, ListTransactionsQuery, ResetFundingRequest, ReversalResponse,
};
use crate::handlers::ProviderCaller;
use crate::models::WalletTransaction;
use crate::state::AppState;

/// POST /api/funding - Credit a seller wallet
pub async fn fund(
    State(state): State<AppState>,
    ProviderCaller(caller): ProviderCaller,
    Json(request): Json<FundRequest>,
) -> Result<Json<FundResponse>, ApiError> {
    request.validate()?;
    let response = state.funding_service.fund(&caller, request).await?;
    Ok(Json(response))
}

/// POST /api/funding/reset - Force-clear a stuck transfer lock
pub async fn reset_funding(
    State(state): State<AppState>,
    ProviderCaller(caller): ProviderCaller,
    Json(request): Json<ResetFundingRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .funding_service
        .reset_funding_lock(&caller, request.seller_id)
        .await?;
    Ok(StatusCode::OK)
}

/// GET /api/funding/transactions - List a seller's wallet transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    ProviderCaller(caller): ProviderCaller,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<WalletTransaction>>, ApiError> {
    let transactions = state
        .funding_service
        .list_transactions(&caller, query.seller_id)
        .await?;
    Ok(Json(transactions))
}

/// DELETE /api/funding/transactions/:id - Reverse a funding transaction
pub async fn delete_transaction(
    State(state): State<AppState>,
    ProviderCaller(caller): ProviderCaller,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<ReversalResponse>, ApiError> {
    let response = state
        .funding_service
        .delete_transaction(&caller, transaction_id)
        .await?;
    Ok(Json(response))
}
