use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a catalog plan
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub image: Option<String>,
}

/// One card in an archive import
#[derive(Debug, Serialize, Deserialize)]
pub struct UnitSeed {
    pub serial: String,
    pub code: String,
}

/// Provider price row created alongside the archive
#[derive(Debug, Deserialize)]
pub struct PriceSeed {
    pub provider_id: Uuid,
    pub price: i64,
    pub seller_price: i64,
    pub company_price: i64,
}

/// Request body for importing an archive batch
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArchiveRequest {
    pub plan_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "units must not be empty"))]
    pub units: Vec<UnitSeed>,
    pub pricing: Vec<PriceSeed>,
}

/// Request body for flipping an archive on or off
#[derive(Debug, Deserialize)]
pub struct ArchiveStatusRequest {
    pub active: bool,
}

/// Query string for the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub plan_id: Uuid,
}

/// Ready stock count for one plan
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub plan_id: Uuid,
    pub available: i64,
}
