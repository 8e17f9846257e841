//! Settlement and payment routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::settlement;
use crate::state::AppState;

/// Create settlement and payment routes
pub fn settlement_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settlements", post(settlement::create_settlement))
        .route("/api/payments", get(settlement::list_payments))
        .route("/api/payments/:id", get(settlement::get_payment))
        .route("/api/payments/:id/activate", post(settlement::activate_payment))
}
