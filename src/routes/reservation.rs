//! Stock reservation routes

use axum::{routing::post, Router};

use crate::handlers::reservation;
use crate::state::AppState;

/// Create stock reservation routes
pub fn reservation_routes() -> Router<AppState> {
    Router::new().route("/api/holds", post(reservation::create_hold))
}
