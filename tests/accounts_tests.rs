//! Account deactivation tests against a live database

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use pinstock_server::accounts::AccountService;
    use pinstock_server::error::ApiError;
    use pinstock_server::events::{DomainEvent, EventBus};
    use pinstock_server::middleware::Caller;
    use pinstock_server::models::{Account, AccountRole};

    /// Helper to create a test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/pinstock_test".to_string());

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        pinstock_server::db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    async fn create_account(
        pool: &PgPool,
        role: AccountRole,
        provider_id: Option<Uuid>,
        wallet_amount: i64,
    ) -> Account {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, display_name, role, provider_id, wallet_amount, device)
            VALUES ($1, $2, $3, $4, $5, 'test-device')
            RETURNING *
            "#,
        )
        .bind(format!("user-{}", Uuid::new_v4().simple()))
        .bind("Test Account")
        .bind(role)
        .bind(provider_id)
        .bind(wallet_amount)
        .fetch_one(pool)
        .await
        .expect("Failed to seed account")
    }

    fn caller_for(account: &Account) -> Caller {
        Caller {
            account_id: account.id,
            role: account.role,
            provider_id: account.provider_id,
            agent_id: account.agent_id,
        }
    }

    async fn is_active(pool: &PgPool, id: Uuid) -> bool {
        sqlx::query_scalar("SELECT active FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_me_reports_current_balances() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let seller = create_account(&pool, AccountRole::Seller, Some(provider.id), 4_200).await;

        let service = AccountService::new(pool.clone(), EventBus::new());
        let me = service.me(&caller_for(&seller)).await.unwrap();

        assert_eq!(me.id, seller.id);
        assert_eq!(me.wallet_amount, 4_200);
        assert_eq!(me.role, AccountRole::Seller);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_deactivation_flips_flag_and_emits() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let seller = create_account(&pool, AccountRole::Seller, Some(provider.id), 0).await;

        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let service = AccountService::new(pool.clone(), bus);
        let response = service
            .deactivate(&caller_for(&provider), seller.id)
            .await
            .expect("deactivation should succeed");

        assert!(!response.active);
        assert!(!is_active(&pool, seller.id).await);

        match rx.try_recv() {
            Ok(DomainEvent::AccountDeactivated { account_id }) => {
                assert_eq!(account_id, seller.id);
            }
            other => panic!("expected AccountDeactivated event, got {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_repeat_deactivation_is_rejected() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let seller = create_account(&pool, AccountRole::Seller, Some(provider.id), 0).await;

        let service = AccountService::new(pool.clone(), EventBus::new());
        service
            .deactivate(&caller_for(&provider), seller.id)
            .await
            .expect("first deactivation should succeed");

        let again = service.deactivate(&caller_for(&provider), seller.id).await;
        assert!(matches!(again, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_self_deactivation_is_rejected() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;

        let service = AccountService::new(pool.clone(), EventBus::new());
        let result = service
            .deactivate(&caller_for(&provider), provider.id)
            .await;

        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert!(is_active(&pool, provider.id).await);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_provider_cannot_reach_foreign_seller() {
        let pool = setup_test_db().await;
        let provider_a = create_account(&pool, AccountRole::Provider, None, 0).await;
        let provider_b = create_account(&pool, AccountRole::Provider, None, 0).await;
        let seller = create_account(&pool, AccountRole::Seller, Some(provider_a.id), 0).await;

        let service = AccountService::new(pool.clone(), EventBus::new());
        let result = service.deactivate(&caller_for(&provider_b), seller.id).await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert!(is_active(&pool, seller.id).await);
    }
}
