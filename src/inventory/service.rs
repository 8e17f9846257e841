//! Inventory service layer - catalog plans, archive imports and stock counts

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::inventory::{CreateArchiveRequest, CreatePlanRequest, PriceSeed, UnitSeed};
use crate::middleware::Caller;
use crate::models::{AccountRole, Archive, Plan};

/// Inventory service owning the catalog and stock import surface
pub struct InventoryService {
    db_pool: PgPool,
}

impl InventoryService {
    /// Create new inventory service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a catalog plan.
    pub async fn create_plan(&self, request: CreatePlanRequest) -> Result<Plan, ApiError> {
        let plan =
            sqlx::query_as::<_, Plan>("INSERT INTO plans (title, image) VALUES ($1, $2) RETURNING *")
                .bind(&request.title)
                .bind(&request.image)
                .fetch_one(&self.db_pool)
                .await?;

        tracing::info!(plan_id = %plan.id, title = %plan.title, "Plan created");
        Ok(plan)
    }

    /// Import an archive batch: the archive row, its stock units and the
    /// provider price rows land in one transaction. A new price row
    /// supersedes the live one for the same provider and plan.
    pub async fn create_archive(
        &self,
        caller: &Caller,
        request: CreateArchiveRequest,
    ) -> Result<Archive, ApiError> {
        let plan: Option<Uuid> = sqlx::query_scalar("SELECT id FROM plans WHERE id = $1")
            .bind(request.plan_id)
            .fetch_optional(&self.db_pool)
            .await?;
        if plan.is_none() {
            return Err(ApiError::NotFound("Plan not found".to_string()));
        }

        let (serials, codes) = seed_arrays(&request.units)?;
        validate_pricing(caller, &request.pricing)?;

        let mut tx = self.db_pool.begin().await?;

        let archive = sqlx::query_as::<_, Archive>(
            "INSERT INTO archives (plan_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(request.plan_id)
        .bind(&request.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(tx_failed)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO stock_units (serial, code, plan_id, archive_id)
            SELECT serial, code, $3, $4
            FROM UNNEST($1::text[], $2::text[]) AS u(serial, code)
            "#,
        )
        .bind(&serials)
        .bind(&codes)
        .bind(request.plan_id)
        .bind(archive.id)
        .execute(&mut *tx)
        .await
        .map_err(tx_failed)?
        .rows_affected();

        if inserted != request.units.len() as u64 {
            tx.rollback().await?;
            return Err(ApiError::TransactionFailed);
        }

        for seed in &request.pricing {
            sqlx::query(
                r#"
                UPDATE custom_prices SET active = FALSE
                WHERE provider_id = $1 AND plan_id = $2 AND active = TRUE
                "#,
            )
            .bind(seed.provider_id)
            .bind(request.plan_id)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?;

            sqlx::query(
                r#"
                INSERT INTO custom_prices
                    (provider_id, plan_id, archive_id, price, seller_price, company_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(seed.provider_id)
            .bind(request.plan_id)
            .bind(archive.id)
            .bind(seed.price)
            .bind(seed.seller_price)
            .bind(seed.company_price)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?;
        }

        tx.commit().await.map_err(tx_failed)?;

        tracing::info!(
            archive_id = %archive.id,
            plan_id = %request.plan_id,
            units = request.units.len(),
            prices = request.pricing.len(),
            "Archive imported"
        );

        Ok(archive)
    }

    /// Flip an archive and all of its stock units on or off together.
    pub async fn set_archive_status(
        &self,
        archive_id: Uuid,
        active: bool,
    ) -> Result<Archive, ApiError> {
        let mut tx = self.db_pool.begin().await?;

        let archive =
            sqlx::query_as::<_, Archive>("UPDATE archives SET active = $1 WHERE id = $2 RETURNING *")
                .bind(active)
                .bind(archive_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(tx_failed)?;

        let archive = match archive {
            Some(a) => a,
            None => {
                tx.rollback().await?;
                return Err(ApiError::NotFound("Archive not found".to_string()));
            }
        };

        sqlx::query("UPDATE stock_units SET active = $1 WHERE archive_id = $2")
            .bind(active)
            .bind(archive_id)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?;

        tx.commit().await.map_err(tx_failed)?;

        tracing::info!(archive_id = %archive_id, active, "Archive status changed");
        Ok(archive)
    }

    /// Delete an archive, its units and its price rows. Refused while any
    /// unit has left `ready`; held and sold rows must keep their history.
    pub async fn delete_archive(&self, archive_id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.db_pool.begin().await?;

        sqlx::query("DELETE FROM stock_units WHERE archive_id = $1 AND status = 'ready'")
            .bind(archive_id)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?;

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_units WHERE archive_id = $1")
                .bind(archive_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(tx_failed)?;

        if remaining > 0 {
            tx.rollback().await?;
            return Err(ApiError::InvalidRequest(
                "Archive has held or sold units and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM custom_prices WHERE archive_id = $1")
            .bind(archive_id)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?;

        let deleted = sqlx::query("DELETE FROM archives WHERE id = $1")
            .bind(archive_id)
            .execute(&mut *tx)
            .await
            .map_err(tx_failed)?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(ApiError::NotFound("Archive not found".to_string()));
        }

        tx.commit().await.map_err(tx_failed)?;

        tracing::info!(archive_id = %archive_id, "Archive deleted");
        Ok(())
    }

    /// Ready stock count for one plan.
    pub async fn availability(&self, plan_id: Uuid) -> Result<i64, ApiError> {
        let available: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_units
            WHERE plan_id = $1 AND status = 'ready' AND active = TRUE
            "#,
        )
        .bind(plan_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(available)
    }
}

/// Split the import into the parallel arrays the bulk insert binds.
fn seed_arrays(units: &[UnitSeed]) -> Result<(Vec<String>, Vec<String>), ApiError> {
    let mut serials = Vec::with_capacity(units.len());
    let mut codes = Vec::with_capacity(units.len());

    for unit in units {
        if unit.serial.trim().is_empty() || unit.code.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "unit serial and code must not be empty".to_string(),
            ));
        }
        serials.push(unit.serial.clone());
        codes.push(unit.code.clone());
    }

    Ok((serials, codes))
}

/// Providers may only submit price rows for themselves; amounts are
/// non-negative integer currency units.
fn validate_pricing(caller: &Caller, pricing: &[PriceSeed]) -> Result<(), ApiError> {
    for seed in pricing {
        if seed.price < 0 || seed.seller_price < 0 || seed.company_price < 0 {
            return Err(ApiError::InvalidRequest(
                "prices must not be negative".to_string(),
            ));
        }
        if caller.role == AccountRole::Provider && seed.provider_id != caller.account_id {
            return Err(ApiError::TenantMismatch);
        }
    }
    Ok(())
}

fn tx_failed(e: sqlx::Error) -> ApiError {
    tracing::error!("Inventory transaction failed: {}", e);
    ApiError::TransactionFailed
}
