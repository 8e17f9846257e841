//! Catalog and stock administration routes

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::inventory;
use crate::state::AppState;

/// Create catalog and stock routes
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plans", post(inventory::create_plan))
        .route("/api/archives", post(inventory::create_archive))
        .route("/api/archives/:id/status", post(inventory::set_archive_status))
        .route("/api/archives/:id", delete(inventory::delete_archive))
        .route("/api/stock/availability", get(inventory::availability))
}
