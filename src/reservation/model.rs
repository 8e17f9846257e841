//! Reservation models and data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request DTO for placing a hold
///
/// `price_id` is optional at the serde level so a missing field surfaces as
/// a domain error instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct HoldRequest {
    pub price_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

/// Response DTO for a placed hold
#[derive(Debug, Serialize)]
pub struct HoldResponse {
    pub hold_token: String,
    /// Per-unit price the seller's customer pays
    pub price: i64,
    /// Per-unit price the seller will be charged at settlement
    pub cost_price: i64,
    pub quantity: i32,
    /// Caller's balance; a hold never changes it
    pub wallet_amount: i64,
}
