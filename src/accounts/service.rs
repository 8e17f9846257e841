//! Account service layer - self lookup and deactivation

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::events::{DomainEvent, EventBus};
use crate::middleware::Caller;
use crate::models::{Account, AccountResponse, AccountRole};

/// Account service owning the small account surface the stock flow needs
pub struct AccountService {
    db_pool: PgPool,
    event_bus: EventBus,
}

impl AccountService {
    /// Create new account service instance
    pub fn new(db_pool: PgPool, event_bus: EventBus) -> Self {
        Self { db_pool, event_bus }
    }

    /// Fetch the caller's own account with the current balances.
    pub async fn me(&self, caller: &Caller) -> Result<AccountResponse, ApiError> {
        let account = self.fetch_account(caller.account_id).await?;
        Ok(account.into())
    }

    /// Deactivate an account. Providers reach only their own sellers and
    /// agents; admins reach anyone but themselves. Tokens already issued
    /// keep verifying, so the active flag is enforced on every request.
    pub async fn deactivate(
        &self,
        caller: &Caller,
        account_id: Uuid,
    ) -> Result<AccountResponse, ApiError> {
        if account_id == caller.account_id {
            return Err(ApiError::InvalidRequest(
                "Cannot deactivate own account".to_string(),
            ));
        }

        let target = self.fetch_account(account_id).await?;
        if !may_deactivate(caller, &target) {
            return Err(ApiError::Forbidden(
                "Account is outside your tenant".to_string(),
            ));
        }

        let deactivated = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET active = FALSE, updated_at = NOW()
            WHERE id = $1 AND active = TRUE
            RETURNING *
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::InvalidRequest("Account is already deactivated".to_string()))?;

        tracing::info!(
            account_id = %account_id,
            by = %caller.account_id,
            "Account deactivated"
        );

        self.event_bus
            .publish(DomainEvent::AccountDeactivated { account_id });

        Ok(deactivated.into())
    }

    async fn fetch_account(&self, id: Uuid) -> Result<Account, ApiError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }
}

/// Admins deactivate anyone; providers only accounts inside their tenant.
fn may_deactivate(caller: &Caller, target: &Account) -> bool {
    match caller.role {
        AccountRole::Admin => true,
        AccountRole::Provider => target.provider_id == Some(caller.account_id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(role: AccountRole, provider_id: Option<Uuid>) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "acct".to_string(),
            display_name: "Account".to_string(),
            role,
            provider_id,
            agent_id: None,
            active: true,
            wallet_amount: 0,
            payment_amount: 0,
            device: None,
            hold_id: None,
            hold_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn caller_of(account: &Account) -> Caller {
        Caller {
            account_id: account.id,
            role: account.role,
            provider_id: account.provider_id,
            agent_id: account.agent_id,
        }
    }

    #[test]
    fn test_admin_reaches_any_account() {
        let admin = account(AccountRole::Admin, None);
        let caller = caller_of(&admin);
        let seller = account(AccountRole::Seller, Some(Uuid::new_v4()));
        assert!(may_deactivate(&caller, &seller));
    }

    #[test]
    fn test_provider_scoped_to_own_tenant() {
        let provider = account(AccountRole::Provider, None);
        let caller = caller_of(&provider);

        let own = account(AccountRole::Seller, Some(provider.id));
        let foreign = account(AccountRole::Seller, Some(Uuid::new_v4()));

        assert!(may_deactivate(&caller, &own));
        assert!(!may_deactivate(&caller, &foreign));
    }

    #[test]
    fn test_seller_may_not_deactivate() {
        let provider_id = Uuid::new_v4();
        let seller = account(AccountRole::Seller, Some(provider_id));
        let caller = caller_of(&seller);

        let peer = account(AccountRole::Seller, Some(provider_id));
        assert!(!may_deactivate(&caller, &peer));
    }
}
