//! Catalog and stock administration: plans, archive imports, availability.

mod model;
mod service;

pub use model::{
    ArchiveStatusRequest, AvailabilityQuery, AvailabilityResponse, CreateArchiveRequest,
    CreatePlanRequest, PriceSeed, UnitSeed,
};
pub use service::InventoryService;
