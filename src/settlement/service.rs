//! Settlement service layer - purchase completion
//!
//! Consumes a hold: marks the held units sold, snapshots the delivered
//! serial/code pairs into an immutable payment record, and debits the
//! seller's wallet, all in one transaction. A consumed or unknown token is
//! indistinguishable on purpose; both surface as `HoldNotFound`.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::events::{DomainEvent, EventBus};
use crate::middleware::Caller;
use crate::models::{Account, AccountRole, CustomPrice, Payment, StockUnit};
use crate::settlement::{PaymentItem, SettleRequest, SettleResponse};

/// Settlement service owning purchase completion and payment records
pub struct SettlementService {
    db_pool: PgPool,
    event_bus: EventBus,
    hold_ttl_minutes: i64,
}

impl SettlementService {
    /// Create new settlement service instance
    pub fn new(db_pool: PgPool, event_bus: EventBus, hold_ttl_minutes: i64) -> Self {
        Self {
            db_pool,
            event_bus,
            hold_ttl_minutes,
        }
    }

    /// Settle a hold into a payment.
    ///
    /// The cost is computed from the live active price for the plan, not the
    /// price at hold time. An expired hold is reverted to ready on the spot
    /// and reported as `HoldExpired`. Failures inside the closing
    /// transaction roll everything back and surface `TransactionFailed`,
    /// which is safe to retry.
    pub async fn settle(
        &self,
        caller: &Caller,
        request: SettleRequest,
    ) -> Result<SettleResponse, ApiError> {
        let hold_token = match request.hold_token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => {
                return Err(ApiError::InvalidRequest(
                    "hold_token is required".to_string(),
                ))
            }
        };

        let buyer = self.fetch_account(caller.account_id).await?;
        if !buyer.active {
            return Err(ApiError::AccountInactive);
        }

        let provider_id = buyer
            .owning_provider()
            .ok_or_else(|| ApiError::InvalidRequest("Account has no provider".to_string()))?;
        if provider_id != buyer.id {
            let provider = self.fetch_account(provider_id).await?;
            if !provider.active {
                return Err(ApiError::ProviderInactive);
            }
        }

        let units = sqlx::query_as::<_, StockUnit>(
            r#"
            SELECT * FROM stock_units
            WHERE hold_id = $1 AND status = 'hold'
              AND provider_id = $2 AND seller_id = $3
            ORDER BY serial
            "#,
        )
        .bind(&hold_token)
        .bind(provider_id)
        .bind(buyer.id)
        .fetch_all(&self.db_pool)
        .await?;

        if units.is_empty() {
            return Err(ApiError::HoldNotFound);
        }

        let archive_ids: Vec<Uuid> = units.iter().map(|u| u.archive_id).collect();
        let inactive_archives: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM archives WHERE id = ANY($1) AND active = FALSE",
        )
        .bind(&archive_ids)
        .fetch_one(&self.db_pool)
        .await?;
        if inactive_archives > 0 {
            return Err(ApiError::ArchiveUnavailable);
        }

        let held_at = units.iter().filter_map(|u| u.hold_at).min();
        if hold_is_expired(held_at, Utc::now(), self.hold_ttl_minutes) {
            self.revert_hold(&hold_token).await?;
            return Err(ApiError::HoldExpired);
        }

        // Reprice from the live row; the hold-time price is informational
        let plan_id = units[0].plan_id;
        let price = sqlx::query_as::<_, CustomPrice>(
            "SELECT * FROM custom_prices WHERE provider_id = $1 AND plan_id = $2 AND active = TRUE",
        )
        .bind(provider_id)
        .bind(plan_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ApiError::PriceNotFound)?;

        let quantity = units.len() as i32;
        let total_cost = price.seller_price * quantity as i64;
        if buyer.wallet_amount < total_cost {
            return Err(ApiError::InsufficientBalance {
                wallet_amount: buyer.wallet_amount,
            });
        }

        let plan_title: String = sqlx::query_scalar("SELECT title FROM plans WHERE id = $1")
            .bind(plan_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

        let mut tx = self.db_pool.begin().await?;

        let sold_rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            UPDATE stock_units
            SET status = 'sold', sold_at = NOW(), hold_id = NULL, hold_at = NULL
            WHERE hold_id = $1 AND status = 'hold'
            RETURNING serial, code
            "#,
        )
        .bind(&hold_token)
        .fetch_all(&mut *tx)
        .await
        .map_err(tx_failed)?;

        if sold_rows.len() != units.len() {
            tx.rollback().await?;
            return Err(ApiError::TransactionFailed);
        }

        let items: Vec<PaymentItem> = sold_rows
            .into_iter()
            .map(|(serial, code)| PaymentItem { serial, code })
            .collect();
        let items_json = serde_json::to_value(&items)
            .map_err(|e| ApiError::InternalError(format!("Failed to encode items: {}", e)))?;

        let payment_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO payments (
                seller_id, provider_id, agent_id, plan_id,
                unit_price, cost_price, quantity, items, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(buyer.id)
        .bind(provider_id)
        .bind(buyer.agent_id)
        .bind(plan_id)
        .bind(price.price)
        .bind(price.seller_price)
        .bind(quantity)
        .bind(&items_json)
        .bind(&request.note)
        .fetch_one(&mut *tx)
        .await
        .map_err(tx_failed)?;

        let new_balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET wallet_amount = wallet_amount - $1,
                payment_amount = payment_amount + $1,
                updated_at = NOW()
            WHERE id = $2 AND wallet_amount >= $1
            RETURNING wallet_amount
            "#,
        )
        .bind(total_cost)
        .bind(buyer.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(tx_failed)?;

        let wallet_amount = match new_balance {
            Some(balance) => balance,
            None => {
                // Balance moved under us since the pre-check
                tx.rollback().await?;
                return Err(ApiError::TransactionFailed);
            }
        };

        tx.commit().await.map_err(tx_failed)?;

        tracing::info!(
            payment_id = %payment_id,
            seller_id = %buyer.id,
            quantity,
            total = total_cost,
            "Hold settled"
        );

        self.event_bus.publish(DomainEvent::SaleSettled {
            payment_id,
            seller_id: buyer.id,
            plan_id,
            quantity,
            total: total_cost,
        });

        let codes = items
            .iter()
            .map(|item| item.code.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(SettleResponse {
            payment_id,
            price: price.price,
            quantity,
            codes,
            plan_title,
            wallet_amount,
            note: request.note,
        })
    }

    /// Fetch one payment, scoped to the caller's tenant.
    pub async fn get_payment(&self, caller: &Caller, payment_id: Uuid) -> Result<Payment, ApiError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

        // Cross-tenant reads look identical to missing rows
        if !caller_may_view(caller, &payment) {
            return Err(ApiError::NotFound("Payment not found".to_string()));
        }

        Ok(payment)
    }

    /// Stamp the activation marker on a payment. This is the only mutation
    /// the record permits, and it is permitted once.
    pub async fn activate_payment(
        &self,
        caller: &Caller,
        payment_id: Uuid,
    ) -> Result<Payment, ApiError> {
        self.get_payment(caller, payment_id).await?;

        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments SET activated_at = NOW()
            WHERE id = $1 AND activated_at IS NULL
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::InvalidRequest("Payment already activated".to_string()))
    }

    /// List the caller's own payments, most recent first.
    pub async fn list_payments(
        &self,
        caller: &Caller,
        limit: Option<i64>,
    ) -> Result<Vec<Payment>, ApiError> {
        let limit = limit.unwrap_or(50).clamp(1, 100);

        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE seller_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(caller.account_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(payments)
    }

    /// Return every unit of an expired hold to stock.
    async fn revert_hold(&self, hold_token: &str) -> Result<(), ApiError> {
        let reverted = sqlx::query(
            r#"
            UPDATE stock_units
            SET status = 'ready', hold_id = NULL, hold_at = NULL
            WHERE hold_id = $1 AND status = 'hold'
            "#,
        )
        .bind(hold_token)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        tracing::info!(units = reverted, "Expired hold reverted to stock");
        Ok(())
    }

    async fn fetch_account(&self, id: Uuid) -> Result<Account, ApiError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }
}

/// A hold placed at or before `now - ttl` is expired.
fn hold_is_expired(held_at: Option<DateTime<Utc>>, now: DateTime<Utc>, ttl_minutes: i64) -> bool {
    match held_at {
        Some(at) => at <= now - Duration::minutes(ttl_minutes),
        None => false,
    }
}

fn caller_may_view(caller: &Caller, payment: &Payment) -> bool {
    match caller.role {
        AccountRole::Admin => true,
        AccountRole::Provider => payment.provider_id == caller.account_id,
        AccountRole::Seller | AccountRole::Agent => payment.seller_id == caller.account_id,
    }
}

fn tx_failed(e: sqlx::Error) -> ApiError {
    tracing::error!("Settlement transaction failed: {}", e);
    ApiError::TransactionFailed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_expiry_boundary() {
        let now = Utc::now();
        let ttl = 30;

        // One second inside the lifetime
        assert!(!hold_is_expired(
            Some(now - Duration::minutes(30) + Duration::seconds(1)),
            now,
            ttl
        ));
        // Exactly at the boundary counts as expired
        assert!(hold_is_expired(Some(now - Duration::minutes(30)), now, ttl));
        // Well past it
        assert!(hold_is_expired(Some(now - Duration::minutes(45)), now, ttl));
        // Missing stamp never expires here; the reaper owns repair
        assert!(!hold_is_expired(None, now, ttl));
    }

    #[test]
    fn test_payment_items_round_trip() {
        let items = vec![
            PaymentItem {
                serial: "SN-001".to_string(),
                code: "CODE-AAA".to_string(),
            },
            PaymentItem {
                serial: "SN-002".to_string(),
                code: "CODE-BBB".to_string(),
            },
        ];

        let value = serde_json::to_value(&items).unwrap();
        let back: Vec<PaymentItem> = serde_json::from_value(value).unwrap();
        assert_eq!(back, items);
    }
}
