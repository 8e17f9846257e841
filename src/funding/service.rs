//! Funding service layer - wallet transfer engine
//!
//! Transfers are serialized per seller through a lock token on the seller
//! row. Acquisition is its own committed conditional update so a concurrent
//! transfer observes the taken lock instead of queueing behind it. The lock
//! is cleared in the same statement that credits the seller; failure paths
//! release it explicitly, and a crash leaves it to the expiry reaper.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::events::{DomainEvent, EventBus};
use crate::funding::{FundRequest, FundResponse, ReversalResponse};
use crate::middleware::Caller;
use crate::models::{
    new_hold_token, Account, AccountRole, FundingSource, TransactionKind, WalletTransaction,
};

/// Funding service owning wallet credits, reversals and the transfer lock
pub struct FundingService {
    db_pool: PgPool,
    event_bus: EventBus,
}

impl FundingService {
    /// Create new funding service instance
    pub fn new(db_pool: PgPool, event_bus: EventBus) -> Self {
        Self { db_pool, event_bus }
    }

    /// Credit a seller wallet from the caller's balance or an admin grant.
    ///
    /// Exactly one transfer per seller may be in flight; a second caller
    /// gets `TransactionInProgress` immediately. Provider-sourced transfers
    /// debit the caller under a balance guard before the seller is
    /// credited.
    pub async fn fund(&self, caller: &Caller, request: FundRequest) -> Result<FundResponse, ApiError> {
        if request.amount < 1 {
            return Err(ApiError::InvalidRequest(
                "amount must be at least 1".to_string(),
            ));
        }
        validate_source(caller.role, request.source)?;

        let seller = self.fetch_account(request.seller_id).await?;
        let tenant_provider = validate_target(caller, &seller)?;

        // Take the per-seller transfer lock; committed on its own so a
        // racing transfer sees it instead of blocking on row locks.
        let lock_token = new_hold_token();
        let locked = sqlx::query(
            r#"
            UPDATE accounts
            SET hold_id = $1, hold_at = NOW(), updated_at = NOW()
            WHERE id = $2 AND hold_id IS NULL
            "#,
        )
        .bind(&lock_token)
        .bind(seller.id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if locked == 0 {
            return Err(ApiError::TransactionInProgress);
        }

        let result = self
            .transfer_locked(&lock_token, caller, &seller, tenant_provider, &request)
            .await;

        if result.is_err() {
            self.release_lock(seller.id, &lock_token).await;
        }

        result
    }

    async fn transfer_locked(
        &self,
        lock_token: &str,
        caller: &Caller,
        seller: &Account,
        tenant_provider: Uuid,
        request: &FundRequest,
    ) -> Result<FundResponse, ApiError> {
        let mut tx = self.db_pool.begin().await?;

        let provider_balance = match request.source {
            FundingSource::Provider => {
                let debited: Option<i64> = sqlx::query_scalar(
                    r#"
                    UPDATE accounts
                    SET wallet_amount = wallet_amount - $1, updated_at = NOW()
                    WHERE id = $2 AND wallet_amount >= $1
                    RETURNING wallet_amount
                    "#,
                )
                .bind(request.amount)
                .bind(caller.account_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(tx_failed)?;

                match debited {
                    Some(balance) => Some(balance),
                    None => {
                        tx.rollback().await?;
                        let balance = self.wallet_amount(caller.account_id).await?;
                        return Err(ApiError::InsufficientBalance {
                            wallet_amount: balance,
                        });
                    }
                }
            }
            FundingSource::Admin => None,
        };

        let transaction_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO wallet_transactions (seller_id, provider_id, amount, source, kind, hold_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(seller.id)
        .bind(tenant_provider)
        .bind(request.amount)
        .bind(request.source)
        .bind(TransactionKind::Funding)
        .bind(lock_token)
        .fetch_one(&mut *tx)
        .await
        .map_err(tx_failed)?;

        // Credit and unlock in one statement, guarded on our own token
        let seller_balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET wallet_amount = wallet_amount + $1,
                hold_id = NULL, hold_at = NULL, updated_at = NOW()
            WHERE id = $2 AND hold_id = $3
            RETURNING wallet_amount
            "#,
        )
        .bind(request.amount)
        .bind(seller.id)
        .bind(lock_token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(tx_failed)?;

        let seller_balance = match seller_balance {
            Some(balance) => balance,
            None => {
                // A force-reset raced us and the lock is no longer ours
                tx.rollback().await?;
                return Err(ApiError::TransactionFailed);
            }
        };

        tx.commit().await.map_err(tx_failed)?;

        tracing::info!(
            transaction_id = %transaction_id,
            seller_id = %seller.id,
            amount = request.amount,
            "Wallet funded"
        );

        self.event_bus.publish(DomainEvent::WalletFunded {
            transaction_id,
            seller_id: seller.id,
            amount: request.amount,
            source: request.source,
        });

        Ok(FundResponse {
            transaction_id,
            provider_balance,
            seller_balance,
        })
    }

    /// Force-clear a stuck transfer lock.
    pub async fn reset_funding_lock(&self, caller: &Caller, seller_id: Uuid) -> Result<(), ApiError> {
        let seller = self.fetch_account(seller_id).await?;
        check_tenant(caller, &seller)?;

        let cleared = sqlx::query(
            r#"
            UPDATE accounts
            SET hold_id = NULL, hold_at = NULL, updated_at = NOW()
            WHERE id = $1 AND hold_id IS NOT NULL
            "#,
        )
        .bind(seller_id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if cleared == 0 {
            return Err(ApiError::NoActiveHold);
        }

        tracing::info!(seller_id = %seller_id, "Transfer lock force-cleared");
        Ok(())
    }

    /// List a seller's wallet transactions, most recent first.
    pub async fn list_transactions(
        &self,
        caller: &Caller,
        seller_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, ApiError> {
        let seller = self.fetch_account(seller_id).await?;
        check_tenant(caller, &seller)?;

        let transactions = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT * FROM wallet_transactions
            WHERE seller_id = $1
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(transactions)
    }

    /// Administrative reversal: re-credit the provider for
    /// provider-sourced rows, re-debit the seller, then drop the row.
    pub async fn delete_transaction(
        &self,
        caller: &Caller,
        transaction_id: Uuid,
    ) -> Result<ReversalResponse, ApiError> {
        let record = sqlx::query_as::<_, WalletTransaction>(
            "SELECT * FROM wallet_transactions WHERE id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

        // Cross-tenant reads look identical to missing rows
        if caller.role == AccountRole::Provider && record.provider_id != caller.account_id {
            return Err(ApiError::NotFound("Transaction not found".to_string()));
        }

        if record.kind == TransactionKind::Refund {
            return Err(ApiError::InvalidRequest(
                "Refund transactions cannot be reversed".to_string(),
            ));
        }

        let mut tx = self.db_pool.begin().await?;

        // Account rows are locked in the funding path's order, provider
        // before seller, so a reversal racing a transfer serializes
        // instead of deadlocking.
        let provider_balance = match record.source {
            FundingSource::Provider => {
                let credited: i64 = sqlx::query_scalar(
                    r#"
                    UPDATE accounts
                    SET wallet_amount = wallet_amount + $1, updated_at = NOW()
                    WHERE id = $2
                    RETURNING wallet_amount
                    "#,
                )
                .bind(record.amount)
                .bind(record.provider_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(tx_failed)?;
                Some(credited)
            }
            FundingSource::Admin => None,
        };

        let seller_balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET wallet_amount = wallet_amount - $1, updated_at = NOW()
            WHERE id = $2 AND wallet_amount >= $1
            RETURNING wallet_amount
            "#,
        )
        .bind(record.amount)
        .bind(record.seller_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(tx_failed)?;

        let seller_balance = match seller_balance {
            Some(balance) => balance,
            None => {
                tx.rollback().await?;
                let balance = self.wallet_amount(record.seller_id).await?;
                return Err(ApiError::InsufficientBalance {
                    wallet_amount: balance,
                });
            }
        };

        let deleted = sqlx::query("DELETE FROM wallet_transactions WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?
            .rows_affected();

        if deleted == 0 {
            // A concurrent reversal got here first
            tx.rollback().await?;
            return Err(ApiError::TransactionFailed);
        }

        tx.commit().await.map_err(tx_failed)?;

        tracing::info!(
            transaction_id = %transaction_id,
            seller_id = %record.seller_id,
            amount = record.amount,
            "Wallet transaction reversed"
        );

        self.event_bus.publish(DomainEvent::FundingReversed {
            transaction_id,
            seller_id: record.seller_id,
            amount: record.amount,
        });

        Ok(ReversalResponse {
            transaction_id,
            seller_balance,
            provider_balance,
        })
    }

    /// Best-effort compensating release; a leftover lock falls to the reaper.
    async fn release_lock(&self, seller_id: Uuid, lock_token: &str) {
        let released = sqlx::query(
            r#"
            UPDATE accounts
            SET hold_id = NULL, hold_at = NULL, updated_at = NOW()
            WHERE id = $1 AND hold_id = $2
            "#,
        )
        .bind(seller_id)
        .bind(lock_token)
        .execute(&self.db_pool)
        .await;

        if let Err(e) = released {
            tracing::error!(
                seller_id = %seller_id,
                "Failed to release transfer lock: {}",
                e
            );
        }
    }

    async fn wallet_amount(&self, account_id: Uuid) -> Result<i64, ApiError> {
        sqlx::query_scalar("SELECT wallet_amount FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }

    async fn fetch_account(&self, id: Uuid) -> Result<Account, ApiError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }
}

/// Providers move their own money; admins grant from outside the ledger.
fn validate_source(role: AccountRole, source: FundingSource) -> Result<(), ApiError> {
    let allowed = matches!(
        (role, source),
        (AccountRole::Provider, FundingSource::Provider) | (AccountRole::Admin, FundingSource::Admin)
    );
    if !allowed {
        return Err(ApiError::InvalidRequest(
            "source does not match the caller's role".to_string(),
        ));
    }
    Ok(())
}

/// The target must be an active seller or agent inside the caller's tenant.
/// Returns the tenant provider recorded on the transaction.
fn validate_target(caller: &Caller, seller: &Account) -> Result<Uuid, ApiError> {
    if !matches!(seller.role, AccountRole::Seller | AccountRole::Agent) {
        return Err(ApiError::InvalidRequest(
            "Funding target must be a seller".to_string(),
        ));
    }
    if !seller.active {
        return Err(ApiError::AccountInactive);
    }

    let tenant_provider = seller
        .provider_id
        .ok_or_else(|| ApiError::InvalidRequest("Seller has no provider".to_string()))?;

    if caller.role == AccountRole::Provider && tenant_provider != caller.account_id {
        return Err(ApiError::TenantMismatch);
    }

    Ok(tenant_provider)
}

fn check_tenant(caller: &Caller, seller: &Account) -> Result<(), ApiError> {
    if caller.role == AccountRole::Provider && seller.provider_id != Some(caller.account_id) {
        return Err(ApiError::TenantMismatch);
    }
    Ok(())
}

fn tx_failed(e: sqlx::Error) -> ApiError {
    tracing::error!("Funding transaction failed: {}", e);
    ApiError::TransactionFailed
}
