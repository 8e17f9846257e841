//! Inventory reservation domain
//!
//! Contains models and the claim workflow for holding stock units.

mod model;
mod service;

pub use model::{HoldRequest, HoldResponse};
pub use service::ReservationService;
