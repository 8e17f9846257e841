//! Settlement models and data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request DTO for settling a hold
///
/// `hold_token` is optional at the serde level so a missing field surfaces
/// as a domain error instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub hold_token: Option<String>,
    pub note: Option<String>,
}

/// Serial/code pair snapshotted into the payment record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PaymentItem {
    pub serial: String,
    pub code: String,
}

/// Receipt returned after a successful settlement
#[derive(Debug, Serialize)]
pub struct SettleResponse {
    pub payment_id: Uuid,
    /// Per-unit price the seller's customer pays
    pub price: i64,
    pub quantity: i32,
    /// Delivered codes, newline-joined for receipt printing
    pub codes: String,
    pub plan_title: String,
    /// Seller balance after the debit
    pub wallet_amount: i64,
    pub note: Option<String>,
}

/// Query parameters for listing payments
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub limit: Option<i64>,
}
