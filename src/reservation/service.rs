//! Reservation service layer - stock claim workflow
//!
//! Claims ready stock units for a buyer under a fresh hold token. The claim
//! is one conditional update checked against the affected row count, so two
//! buyers racing for the same units cannot both win.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::Caller;
use crate::models::{new_hold_token, Account, AccountRole, CustomPrice};
use crate::reservation::{HoldRequest, HoldResponse};

/// Upper bound for a provider-side bulk hold
const BULK_QUANTITY_LIMIT: i32 = 100;

/// Reservation service for placing holds on stock
pub struct ReservationService {
    db_pool: PgPool,
}

impl ReservationService {
    /// Create new reservation service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Place a hold on `quantity` ready units of the priced plan.
    ///
    /// Validation order: request shape, quantity tier, buyer account, owning
    /// provider, price row and its tenant, balance, then stock. Nothing is
    /// written unless every selected unit is still claimable; losing the
    /// race surfaces as `OutOfStock` with no mutation. The wallet is not
    /// touched until settlement.
    pub async fn hold(
        &self,
        caller: &Caller,
        request: HoldRequest,
    ) -> Result<HoldResponse, ApiError> {
        let price_id = request
            .price_id
            .ok_or_else(|| ApiError::InvalidRequest("price_id is required".to_string()))?;
        let quantity = request.quantity.unwrap_or(1);

        validate_quantity(caller.role, quantity)?;

        // Fresh read; the extractor's view may already be stale
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

        let price = sqlx::query_as::<_, CustomPrice>(
            "SELECT * FROM custom_prices WHERE id = $1 AND active = TRUE",
        )
        .bind(price_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ApiError::PriceNotFound)?;

        if price.provider_id != provider_id {
            return Err(ApiError::TenantMismatch);
        }

        let total_cost = price.seller_price * quantity as i64;
        if buyer.wallet_amount < total_cost {
            return Err(ApiError::InsufficientBalance {
                wallet_amount: buyer.wallet_amount,
            });
        }

        let candidate_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM stock_units
            WHERE plan_id = $1 AND status = 'ready' AND active = TRUE
            ORDER BY created_at
            LIMIT $2
            "#,
        )
        .bind(price.plan_id)
        .bind(quantity as i64)
        .fetch_all(&self.db_pool)
        .await?;

        if candidate_ids.len() < quantity as usize {
            return Err(ApiError::OutOfStock);
        }

        let hold_token = new_hold_token();

        // Claim the candidates while they are still ready. A racing hold
        // shrinks the affected row count and the whole claim is abandoned.
        let mut tx = self.db_pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE stock_units
            SET status = 'hold', hold_id = $1, hold_at = NOW(),
                provider_id = $2, seller_id = $3
            WHERE id = ANY($4) AND status = 'ready' AND active = TRUE
            "#,
        )
        .bind(&hold_token)
        .bind(provider_id)
        .bind(buyer.id)
        .bind(&candidate_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed != quantity as u64 {
            tx.rollback().await?;
            return Err(ApiError::OutOfStock);
        }

        tx.commit().await?;

        tracing::info!(
            seller_id = %buyer.id,
            plan_id = %price.plan_id,
            quantity,
            "Stock units held"
        );

        Ok(HoldResponse {
            hold_token,
            price: price.price,
            cost_price: price.seller_price,
            quantity,
            wallet_amount: buyer.wallet_amount,
        })
    }

    async fn fetch_account(&self, id: Uuid) -> Result<Account, ApiError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }
}

/// Per-role quantity tiering: sellers and agents buy one unit at a time,
/// the provider/admin path may bulk-hold up to the limit.
fn validate_quantity(role: AccountRole, quantity: i32) -> Result<(), ApiError> {
    if quantity < 1 {
        return Err(ApiError::InvalidRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    match role {
        AccountRole::Seller | AccountRole::Agent => {
            if quantity > 1 {
                return Err(ApiError::UnsupportedQuantity);
            }
        }
        AccountRole::Provider | AccountRole::Admin => {
            if quantity > BULK_QUANTITY_LIMIT {
                return Err(ApiError::QuantityLimitExceeded);
            }
        }
    }

    Ok(())
}
