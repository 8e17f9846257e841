//! Catalog administration tests against a live database

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use pinstock_server::error::ApiError;
    use pinstock_server::inventory::{
        CreateArchiveRequest, CreatePlanRequest, InventoryService, PriceSeed, UnitSeed,
    };
    use pinstock_server::middleware::Caller;
    use pinstock_server::models::{Account, AccountRole, Archive};

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

    fn unit_seeds(count: usize, tag: &str) -> Vec<UnitSeed> {
        (0..count)
            .map(|i| UnitSeed {
                serial: format!("SN-{}-{}", tag, i),
                code: format!("CODE-{}-{}", tag, i),
            })
            .collect()
    }

    fn price_seed(provider_id: Uuid, seller_price: i64) -> PriceSeed {
        PriceSeed {
            provider_id,
            price: seller_price + 200,
            seller_price,
            company_price: seller_price - 200,
        }
    }

    async fn seed_plan(pool: &PgPool) -> Uuid {
        let service = InventoryService::new(pool.clone());
        service
            .create_plan(CreatePlanRequest {
                title: format!("Plan {}", Uuid::new_v4().simple()),
                image: None,
            })
            .await
            .expect("plan should be created")
            .id
    }

    async fn import_archive(
        pool: &PgPool,
        provider: &Account,
        plan_id: Uuid,
        units: usize,
        seller_price: i64,
    ) -> Archive {
        let service = InventoryService::new(pool.clone());
        service
            .create_archive(
                &caller_for(provider),
                CreateArchiveRequest {
                    plan_id,
                    name: format!("Batch {}", Uuid::new_v4().simple()),
                    units: unit_seeds(units, &Uuid::new_v4().simple().to_string()),
                    pricing: vec![price_seed(provider.id, seller_price)],
                },
            )
            .await
            .expect("import should succeed")
    }

    async fn ready_units(pool: &PgPool, archive_id: Uuid) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_units WHERE archive_id = $1 AND status = 'ready'",
        )
        .bind(archive_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_import_lands_units_and_price_together() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let plan_id = seed_plan(&pool).await;

        let archive = import_archive(&pool, &provider, plan_id, 3, 1_000).await;
        assert!(archive.active);
        assert_eq!(archive.plan_id, plan_id);

        assert_eq!(ready_units(&pool, archive.id).await, 3);

        let live_price: i64 = sqlx::query_scalar(
            r#"
            SELECT seller_price FROM custom_prices
            WHERE provider_id = $1 AND plan_id = $2 AND active = TRUE
            "#,
        )
        .bind(provider.id)
        .bind(plan_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(live_price, 1_000);

        let service = InventoryService::new(pool.clone());
        assert_eq!(service.availability(plan_id).await.unwrap(), 3);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_new_import_supersedes_live_price() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let plan_id = seed_plan(&pool).await;

        import_archive(&pool, &provider, plan_id, 1, 1_000).await;
        import_archive(&pool, &provider, plan_id, 1, 1_500).await;

        // Exactly one live row survives and it carries the new price
        let live: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT seller_price FROM custom_prices
            WHERE provider_id = $1 AND plan_id = $2 AND active = TRUE
            "#,
        )
        .bind(provider.id)
        .bind(plan_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(live, vec![1_500]);

        // The superseded row stays behind for history
        let retired: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM custom_prices
            WHERE provider_id = $1 AND plan_id = $2 AND active = FALSE
            "#,
        )
        .bind(provider.id)
        .bind(plan_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(retired, 1);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_import_rejects_unknown_plan() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;

        let service = InventoryService::new(pool.clone());
        let result = service
            .create_archive(
                &caller_for(&provider),
                CreateArchiveRequest {
                    plan_id: Uuid::new_v4(),
                    name: "Orphan batch".to_string(),
                    units: unit_seeds(1, "orphan"),
                    pricing: vec![price_seed(provider.id, 1_000)],
                },
            )
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_status_flip_cascades_to_units() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let plan_id = seed_plan(&pool).await;
        let archive = import_archive(&pool, &provider, plan_id, 3, 1_000).await;

        let service = InventoryService::new(pool.clone());
        let flipped = service
            .set_archive_status(archive.id, false)
            .await
            .expect("flip should succeed");
        assert!(!flipped.active);

        let inactive_units: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_units WHERE archive_id = $1 AND active = FALSE",
        )
        .bind(archive.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(inactive_units, 3);
        assert_eq!(service.availability(plan_id).await.unwrap(), 0);

        // Reactivation brings the batch back into the sellable pool
        service
            .set_archive_status(archive.id, true)
            .await
            .expect("flip back should succeed");
        assert_eq!(service.availability(plan_id).await.unwrap(), 3);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_status_flip_missing_archive_is_not_found() {
        let pool = setup_test_db().await;

        let service = InventoryService::new(pool.clone());
        let result = service.set_archive_status(Uuid::new_v4(), false).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_delete_refused_while_history_exists() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let plan_id = seed_plan(&pool).await;
        let archive = import_archive(&pool, &provider, plan_id, 2, 1_000).await;

        let sold_id: Uuid = sqlx::query_scalar(
            r#"
            UPDATE stock_units SET status = 'sold', sold_at = NOW()
            WHERE id = (SELECT id FROM stock_units WHERE archive_id = $1 LIMIT 1)
            RETURNING id
            "#,
        )
        .bind(archive.id)
        .fetch_one(&pool)
        .await
        .unwrap();

        let service = InventoryService::new(pool.clone());
        let result = service.delete_archive(archive.id).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));

        // The refused delete must not have eaten the ready unit either
        let survivors: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_units WHERE archive_id = $1")
                .bind(archive.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(survivors, 2);

        // Once the sold unit is back to ready the batch can go
        sqlx::query("UPDATE stock_units SET status = 'ready', sold_at = NULL WHERE id = $1")
            .bind(sold_id)
            .execute(&pool)
            .await
            .unwrap();

        service
            .delete_archive(archive.id)
            .await
            .expect("delete should succeed");

        let units_left: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_units WHERE archive_id = $1")
                .bind(archive.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        let prices_left: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM custom_prices WHERE archive_id = $1")
                .bind(archive.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        let archives_left: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM archives WHERE id = $1")
                .bind(archive.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(units_left, 0);
        assert_eq!(prices_left, 0);
        assert_eq!(archives_left, 0);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_delete_missing_archive_is_not_found() {
        let pool = setup_test_db().await;

        let service = InventoryService::new(pool.clone());
        let result = service.delete_archive(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_availability_counts_only_sellable_units() {
        let pool = setup_test_db().await;
        let provider = create_account(&pool, AccountRole::Provider, None, 0).await;
        let plan_id = seed_plan(&pool).await;
        let archive = import_archive(&pool, &provider, plan_id, 3, 1_000).await;

        // One unit held, one switched off; only the third still counts
        sqlx::query(
            r#"
            UPDATE stock_units SET status = 'hold', hold_id = 'tok', hold_at = NOW()
            WHERE id = (SELECT id FROM stock_units WHERE archive_id = $1 LIMIT 1)
            "#,
        )
        .bind(archive.id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            r#"
            UPDATE stock_units SET active = FALSE
            WHERE id = (
                SELECT id FROM stock_units
                WHERE archive_id = $1 AND status = 'ready' AND active = TRUE
                LIMIT 1
            )
            "#,
        )
        .bind(archive.id)
        .execute(&pool)
        .await
        .unwrap();

        let service = InventoryService::new(pool.clone());
        assert_eq!(service.availability(plan_id).await.unwrap(), 1);
    }
}
