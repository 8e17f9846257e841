//! Account routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::accounts;
use crate::state::AppState;

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/accounts/me", get(accounts::me))
        .route("/api/accounts/:id/deactivate", post(accounts::deactivate))
}
