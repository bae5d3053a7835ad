// src/db/view_repo.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::views::{ViewRecord, ViewSet, ViewTarget},
};

#[derive(FromRow)]
struct ViewRow {
    entity_id: Uuid,
    user_id: Uuid,
    user_name: String,
    viewed_at: DateTime<Utc>,
}

// Registro de "visto por" compartilhado por pendências, trocas de turno e solicitações
#[derive(Clone)]
pub struct ViewRepository {
    pool: PgPool,
}

impl ViewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Uma linha por usuário; o horário só avança. Devolve o horário que ficou gravado.
    pub async fn upsert(&self, target: ViewTarget, entity_id: Uuid, user_id: Uuid) -> Result<DateTime<Utc>, AppError> {
        let (table, key) = (target.table(), target.key_column());
        let sql = format!(
            "INSERT INTO {table} ({key}, user_id, viewed_at) VALUES ($1, $2, NOW())
             ON CONFLICT ({key}, user_id)
             DO UPDATE SET viewed_at = GREATEST({table}.viewed_at, EXCLUDED.viewed_at)
             RETURNING viewed_at"
        );
        let viewed_at = sqlx::query_scalar::<_, DateTime<Utc>>(&sql)
            .bind(entity_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(viewed_at)
    }

    pub async fn list_for(&self, target: ViewTarget, entity_id: Uuid) -> Result<Vec<ViewRecord>, AppError> {
        let mut grouped = self.list_for_many(target, &[entity_id]).await?;
        Ok(grouped.remove(&entity_id).unwrap_or_default())
    }

    /// Visualizações de vários registros de uma vez, já reconciliadas por usuário.
    pub async fn list_for_many(
        &self,
        target: ViewTarget,
        entity_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ViewRecord>>, AppError> {
        if entity_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let (table, key) = (target.table(), target.key_column());
        let sql = format!(
            "SELECT v.{key} AS entity_id, v.user_id, u.full_name AS user_name, v.viewed_at
             FROM {table} v
             JOIN users u ON u.id = v.user_id
             WHERE v.{key} = ANY($1)"
        );
        let rows = sqlx::query_as::<_, ViewRow>(&sql)
            .bind(entity_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut sets: HashMap<Uuid, ViewSet> = HashMap::new();
        for row in rows {
            sets.entry(row.entity_id).or_default().record(ViewRecord {
                user_id: row.user_id,
                user_name: row.user_name,
                viewed_at: row.viewed_at,
            });
        }

        Ok(sets.into_iter().map(|(id, set)| (id, set.into_sorted())).collect())
    }
}
