//! Expiry reaper - background recovery of abandoned holds
//!
//! Two sweeps run on a fixed interval: stock units stuck in `hold` past
//! the TTL go back to `ready`, and seller transfer locks older than the
//! TTL are force-cleared. Both use the same conditional-update shape as
//! the foreground paths, so a settle racing the reaper loses cleanly on
//! `rows_affected`.

use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use crate::error::ApiError;
use crate::events::{DomainEvent, EventBus};

/// Background sweeper for expired holds and stale transfer locks
pub struct ReaperService {
    db_pool: PgPool,
    event_bus: EventBus,
    hold_ttl_minutes: i32,
}

impl ReaperService {
    /// Create new reaper service instance
    pub fn new(db_pool: PgPool, event_bus: EventBus, hold_ttl_minutes: i32) -> Self {
        Self {
            db_pool,
            event_bus,
            hold_ttl_minutes,
        }
    }

    /// Return expired held units to stock. Returns the number released.
    pub async fn release_expired_units(&self) -> Result<u64, ApiError> {
        let released = sqlx::query(
            r#"
            UPDATE stock_units
            SET status = 'ready', hold_id = NULL, hold_at = NULL
            WHERE status = 'hold'
              AND hold_at <= NOW() - make_interval(mins => $1)
            "#,
        )
        .bind(self.hold_ttl_minutes)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(released)
    }

    /// Clear transfer locks abandoned by a crashed funding call.
    pub async fn release_stale_funding_locks(&self) -> Result<u64, ApiError> {
        let cleared = sqlx::query(
            r#"
            UPDATE accounts
            SET hold_id = NULL, hold_at = NULL, updated_at = NOW()
            WHERE hold_id IS NOT NULL
              AND hold_at <= NOW() - make_interval(mins => $1)
            "#,
        )
        .bind(self.hold_ttl_minutes)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(cleared)
    }

    /// One reaper pass. Each sweep runs even if the other fails.
    pub async fn sweep(&self) {
        let units_released = match self.release_expired_units().await {
            Ok(count) => count,
            Err(e) => {
                error!("Expired unit sweep failed: {}", e);
                0
            }
        };

        let locks_cleared = match self.release_stale_funding_locks().await {
            Ok(count) => count,
            Err(e) => {
                error!("Stale lock sweep failed: {}", e);
                0
            }
        };

        if units_released > 0 || locks_cleared > 0 {
            info!(
                units_released,
                locks_cleared, "Reaper released expired holds"
            );
            self.event_bus.publish(DomainEvent::HoldsReaped {
                units_released,
                locks_cleared,
            });
        }
    }
}

/// Run the reaper on a fixed interval. Spawned once at startup.
pub async fn run_reaper(reaper: ReaperService, interval_seconds: u64) {
    info!(interval_seconds, "Expiry reaper started");
    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
    // the first tick fires immediately; skip straight into the wait
    interval.tick().await;

    loop {
        interval.tick().await;
        reaper.sweep().await;
    }
}
