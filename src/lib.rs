//! PinStock backend
//!
//! Point-of-sale backend for reselling prepaid digital cards through an
//! admin, provider, agent, seller hierarchy. Stock units are claimed with
//! a short-lived hold, settled into an immutable payment against the
//! seller's wallet, and reclaimed by a background reaper when abandoned.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod funding;
pub mod handlers;
pub mod inventory;
pub mod middleware;
pub mod models;
pub mod reaper;
pub mod reservation;
pub mod routes;
pub mod settlement;
pub mod state;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Assemble the application router with all routes and shared middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(routes::reservation_routes())
        .merge(routes::settlement_routes())
        .merge(routes::funding_routes())
        .merge(routes::inventory_routes())
        .merge(routes::account_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}
