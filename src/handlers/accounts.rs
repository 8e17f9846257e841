//! Account HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{Caller, ProviderCaller};
use crate::models::AccountResponse;
use crate::state::AppState;

/// GET /api/accounts/me - The caller's own account and balances
pub async fn me(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.account_service.me(&caller).await?;
    Ok(Json(account))
}

/// POST /api/accounts/:id/deactivate - Disable an account
pub async fn deactivate(
    State(state): State<AppState>,
    ProviderCaller(caller): ProviderCaller,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .account_service
        .deactivate(&caller, account_id)
        .await?;
    Ok(Json(account))
}
