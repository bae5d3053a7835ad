// src/db/asset_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{on_unique_violation, AppError},
    models::asset::{Asset, AssetFields, AssetFilter, AssetStatus, MaintenanceRecord},
};

const ASSET_COLUMNS: &str = "id, category_id, serial_number, description, status, holder_name, holder_registration, \
     metadata, decommissioned_at, decommission_reason, decommissioned_by, created_at, updated_at";
const MAINTENANCE_COLUMNS: &str = "id, asset_id, description, opened_by, opened_at, closed_at, resolution";

#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, AppError> {
        let sql = format!(
            "SELECT {ASSET_COLUMNS} FROM assets
             WHERE ($1::text IS NULL OR status::text = $1)
               AND ($2::uuid IS NULL OR category_id = $2)
               AND ($3::text IS NULL OR serial_number ILIKE '%' || $3 || '%')
             ORDER BY created_at DESC"
        );
        let assets = sqlx::query_as::<_, Asset>(&sql)
            .bind(filter.status.map(AssetStatus::label))
            .bind(filter.category_id)
            .bind(filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()))
            .fetch_all(&self.pool)
            .await?;
        Ok(assets)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(asset)
    }

    pub async fn find_by_serial(&self, serial_number: &str) -> Result<Option<Asset>, AppError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE serial_number = $1");
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(asset)
    }

    /// Busca travando a linha: as transições de status leem e gravam na mesma transação.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Asset>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1 FOR UPDATE");
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(asset)
    }

    pub async fn create<'e, E>(&self, executor: E, fields: &AssetFields) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO assets (category_id, serial_number, description, holder_name, holder_registration, metadata)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ASSET_COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(fields.category_id)
            .bind(&fields.serial_number)
            .bind(&fields.description)
            .bind(&fields.holder_name)
            .bind(&fields.holder_registration)
            .bind(&fields.metadata)
            .fetch_one(executor)
            .await
            .map_err(|e| on_unique_violation(e, || AppError::SerialAlreadyExists(fields.serial_number.clone())))?;
        Ok(asset)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, fields: &AssetFields) -> Result<Option<Asset>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE assets
             SET category_id = $2, serial_number = $3, description = $4,
                 holder_name = $5, holder_registration = $6, metadata = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING {ASSET_COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(id)
            .bind(fields.category_id)
            .bind(&fields.serial_number)
            .bind(&fields.description)
            .bind(&fields.holder_name)
            .bind(&fields.holder_registration)
            .bind(&fields.metadata)
            .fetch_optional(executor)
            .await
            .map_err(|e| on_unique_violation(e, || AppError::SerialAlreadyExists(fields.serial_number.clone())))?;
        Ok(asset)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AssetStatus,
        holder_name: Option<&str>,
        holder_registration: Option<&str>,
    ) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE assets
             SET status = $2, holder_name = $3, holder_registration = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {ASSET_COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(id)
            .bind(status)
            .bind(holder_name)
            .bind(holder_registration)
            .fetch_one(executor)
            .await?;
        Ok(asset)
    }

    pub async fn decommission<'e, E>(&self, executor: E, id: Uuid, reason: &str, by: Uuid) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE assets
             SET status = 'Descartado', holder_name = NULL, holder_registration = NULL,
                 decommissioned_at = NOW(), decommission_reason = $2, decommissioned_by = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {ASSET_COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(id)
            .bind(reason)
            .bind(by)
            .fetch_one(executor)
            .await?;
        Ok(asset)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Histórico de manutenção
    // ---

    pub async fn list_maintenance(&self, asset_id: Uuid) -> Result<Vec<MaintenanceRecord>, AppError> {
        let sql = format!("SELECT {MAINTENANCE_COLUMNS} FROM maintenance_records WHERE asset_id = $1 ORDER BY opened_at DESC");
        let records = sqlx::query_as::<_, MaintenanceRecord>(&sql)
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    pub async fn open_maintenance<'e, E>(
        &self,
        executor: E,
        asset_id: Uuid,
        description: &str,
        opened_by: Uuid,
    ) -> Result<MaintenanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO maintenance_records (asset_id, description, opened_by)
             VALUES ($1, $2, $3)
             RETURNING {MAINTENANCE_COLUMNS}"
        );
        let record = sqlx::query_as::<_, MaintenanceRecord>(&sql)
            .bind(asset_id)
            .bind(description)
            .bind(opened_by)
            .fetch_one(executor)
            .await?;
        Ok(record)
    }

    /// Fecha os registros em aberto do ativo (normalmente só um).
    pub async fn close_maintenance<'e, E>(
        &self,
        executor: E,
        asset_id: Uuid,
        resolution: Option<&str>,
    ) -> Result<Vec<MaintenanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE maintenance_records SET closed_at = NOW(), resolution = $2
             WHERE asset_id = $1 AND closed_at IS NULL
             RETURNING {MAINTENANCE_COLUMNS}"
        );
        let records = sqlx::query_as::<_, MaintenanceRecord>(&sql)
            .bind(asset_id)
            .bind(resolution)
            .fetch_all(executor)
            .await?;
        Ok(records)
    }
}
