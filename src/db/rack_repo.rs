// src/db/rack_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{on_unique_violation, AppError},
    models::rack::{contains_pattern, Address, AddressItem, ItemLocation, Rack},
};

const RACK_COLUMNS: &str = "id, name, levels, positions_per_level, created_at, updated_at";
const ADDRESS_COLUMNS: &str = "id, rack_id, level, name, items, observation, created_at, updated_at";

#[derive(Clone)]
pub struct RackRepository {
    pool: PgPool,
}

impl RackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_racks(&self) -> Result<Vec<Rack>, AppError> {
        let sql = format!("SELECT {RACK_COLUMNS} FROM racks ORDER BY name ASC");
        let racks = sqlx::query_as::<_, Rack>(&sql).fetch_all(&self.pool).await?;
        Ok(racks)
    }

    pub async fn find_rack<'e, E>(&self, executor: E, rack_id: Uuid) -> Result<Option<Rack>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {RACK_COLUMNS} FROM racks WHERE id = $1");
        let rack = sqlx::query_as::<_, Rack>(&sql)
            .bind(rack_id)
            .fetch_optional(executor)
            .await?;
        Ok(rack)
    }

    /// Mesma busca, travando a linha até o fim da transação.
    pub async fn lock_rack<'e, E>(&self, executor: E, rack_id: Uuid) -> Result<Option<Rack>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {RACK_COLUMNS} FROM racks WHERE id = $1 FOR UPDATE");
        let rack = sqlx::query_as::<_, Rack>(&sql)
            .bind(rack_id)
            .fetch_optional(executor)
            .await?;
        Ok(rack)
    }

    pub async fn list_addresses(&self, rack_id: Uuid) -> Result<Vec<Address>, AppError> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM rack_addresses WHERE rack_id = $1 ORDER BY level, name");
        let addresses = sqlx::query_as::<_, Address>(&sql)
            .bind(rack_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(addresses)
    }

    pub async fn existing_levels<'e, E>(&self, executor: E, rack_id: Uuid) -> Result<Vec<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let levels: Vec<i32> =
            sqlx::query_scalar("SELECT DISTINCT level FROM rack_addresses WHERE rack_id = $1 ORDER BY level")
                .bind(rack_id)
                .fetch_all(executor)
                .await?;
        Ok(levels)
    }

    pub async fn names_at_level<'e, E>(&self, executor: E, rack_id: Uuid, level: i32) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM rack_addresses WHERE rack_id = $1 AND level = $2")
                .bind(rack_id)
                .bind(level)
                .fetch_all(executor)
                .await?;
        Ok(names)
    }

    /// Procura endereços que guardam um item com o nome informado (parcial, sem caixa).
    pub async fn search_items(&self, query: &str) -> Result<Vec<ItemLocation>, AppError> {
        let locations = sqlx::query_as::<_, ItemLocation>(
            r#"
            SELECT r.id AS rack_id, r.name AS rack_name, a.id AS address_id,
                   a.level, a.name AS position, a.items
            FROM rack_addresses a
            JOIN racks r ON r.id = a.rack_id
            WHERE EXISTS (
                SELECT 1 FROM jsonb_array_elements(a.items) AS item
                WHERE item->>'name' ILIKE $1 ESCAPE '\'
            )
            ORDER BY r.name, a.level, a.name
            "#,
        )
        .bind(contains_pattern(query))
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    // ---
    // Escrita (sempre dentro da transação do serviço)
    // ---

    pub async fn create_rack<'e, E>(
        &self,
        executor: E,
        name: &str,
        levels: i32,
        positions_per_level: i32,
    ) -> Result<Rack, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO racks (name, levels, positions_per_level) VALUES ($1, $2, $3) RETURNING {RACK_COLUMNS}"
        );
        let rack = sqlx::query_as::<_, Rack>(&sql)
            .bind(name)
            .bind(levels)
            .bind(positions_per_level)
            .fetch_one(executor)
            .await
            .map_err(|e| on_unique_violation(e, || AppError::RackNameAlreadyExists(name.to_string())))?;
        Ok(rack)
    }

    /// Insere o bloco de endereços num único comando; pares já existentes são ignorados.
    pub async fn insert_addresses<'e, E>(
        &self,
        executor: E,
        rack_id: Uuid,
        addresses: &[(i32, String)],
    ) -> Result<Vec<Address>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (levels, names): (Vec<i32>, Vec<String>) = addresses.iter().cloned().unzip();

        let sql = format!(
            "INSERT INTO rack_addresses (rack_id, level, name)
             SELECT $1, level, name FROM UNNEST($2::int4[], $3::text[]) AS t(level, name)
             ON CONFLICT (rack_id, level, name) DO NOTHING
             RETURNING {ADDRESS_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Address>(&sql)
            .bind(rack_id)
            .bind(levels)
            .bind(names)
            .fetch_all(executor)
            .await?;
        Ok(inserted)
    }

    pub async fn delete_levels<'e, E>(&self, executor: E, rack_id: Uuid, levels: &[i32]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM rack_addresses WHERE rack_id = $1 AND level = ANY($2)")
            .bind(rack_id)
            .bind(levels)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_positions<'e, E>(
        &self,
        executor: E,
        rack_id: Uuid,
        level: i32,
        names: &[String],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM rack_addresses WHERE rack_id = $1 AND level = $2 AND name = ANY($3)")
            .bind(rack_id)
            .bind(level)
            .bind(names)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// `levels` passa a ser a contagem de níveis distintos que sobraram.
    pub async fn recount_levels<'e, E>(&self, executor: E, rack_id: Uuid) -> Result<Rack, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE racks
             SET levels = (SELECT COUNT(DISTINCT level) FROM rack_addresses WHERE rack_id = $1),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {RACK_COLUMNS}"
        );
        let rack = sqlx::query_as::<_, Rack>(&sql)
            .bind(rack_id)
            .fetch_one(executor)
            .await?;
        Ok(rack)
    }

    pub async fn delete_all_addresses<'e, E>(&self, executor: E, rack_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM rack_addresses WHERE rack_id = $1")
            .bind(rack_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_rack<'e, E>(&self, executor: E, rack_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM racks WHERE id = $1")
            .bind(rack_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Edição completa do endereço: a lista de itens substitui a anterior.
    pub async fn update_address(
        &self,
        address_id: Uuid,
        items: Vec<AddressItem>,
        observation: Option<&str>,
    ) -> Result<Option<Address>, AppError> {
        let sql = format!(
            "UPDATE rack_addresses SET items = $2, observation = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {ADDRESS_COLUMNS}"
        );
        let address = sqlx::query_as::<_, Address>(&sql)
            .bind(address_id)
            .bind(Json(items))
            .bind(observation)
            .fetch_optional(&self.pool)
            .await?;
        Ok(address)
    }
}
