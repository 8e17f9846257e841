//! Wallet transfer models and data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::FundingSource;

/// Request DTO for funding a seller wallet
#[derive(Debug, Deserialize, Validate)]
pub struct FundRequest {
    pub seller_id: Uuid,
    #[validate(range(min = 1, message = "amount must be at least 1"))]
    pub amount: i64,
    pub source: FundingSource,
}

/// Response DTO after a successful transfer
#[derive(Debug, Serialize)]
pub struct FundResponse {
    pub transaction_id: Uuid,
    /// Provider balance after the debit; absent for admin-sourced grants
    pub provider_balance: Option<i64>,
    pub seller_balance: i64,
}

/// Request DTO for force-clearing a stuck transfer lock
#[derive(Debug, Deserialize)]
pub struct ResetFundingRequest {
    pub seller_id: Uuid,
}

/// Query parameters for listing wallet transactions
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub seller_id: Uuid,
}

/// Response DTO after an administrative reversal
#[derive(Debug, Serialize)]
pub struct ReversalResponse {
    pub transaction_id: Uuid,
    pub seller_balance: i64,
    /// Provider balance after the re-credit; absent for admin-sourced rows
    pub provider_balance: Option<i64>,
}
