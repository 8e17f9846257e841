//! Shared application state wired into every route

use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

use crate::accounts::AccountService;
use crate::config::Config;
use crate::events::EventBus;
use crate::funding::FundingService;
use crate::inventory::InventoryService;
use crate::reservation::ReservationService;
use crate::settlement::SettlementService;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub event_bus: EventBus,
    pub account_service: Arc<AccountService>,
    pub reservation_service: Arc<ReservationService>,
    pub settlement_service: Arc<SettlementService>,
    pub funding_service: Arc<FundingService>,
    pub inventory_service: Arc<InventoryService>,
}

impl AppState {
    /// Build the state and the service graph behind it
    pub fn new(pool: PgPool, config: Arc<Config>, event_bus: EventBus) -> Self {
        let account_service = Arc::new(AccountService::new(pool.clone(), event_bus.clone()));
        let reservation_service = Arc::new(ReservationService::new(pool.clone()));
        let settlement_service = Arc::new(SettlementService::new(
            pool.clone(),
            event_bus.clone(),
            i64::from(config.hold_ttl_minutes),
        ));
        let funding_service = Arc::new(FundingService::new(pool.clone(), event_bus.clone()));
        let inventory_service = Arc::new(InventoryService::new(pool.clone()));

        Self {
            pool,
            config,
            event_bus,
            account_service,
            reservation_service,
            settlement_service,
            funding_service,
            inventory_service,
        }
    }
}

// The auth extractor pulls these out of any state that carries them.

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Arc<Config> {
        state.config.clone()
    }
}
