//! Wallet funding routes

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::funding;
use crate::state::AppState;

/// Create wallet funding routes
pub fn funding_routes() -> Router<AppState> {
    Router::new()
        .route("/api/funding", post(funding::fund))
        .route("/api/funding/reset", post(funding::reset_funding))
        .route("/api/funding/transactions", get(funding::list_transactions))
        .route(
            "/api/funding/transactions/:id",
            delete(funding::delete_transaction),
        )
}
