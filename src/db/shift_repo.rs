// src/db/shift_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::shift_change::{ShiftChange, ShiftChangeFields, ShiftChangeStatus},
};

// Mantém o nome do autor junto, como o frontend exibe
const SELECT_SHIFT: &str = r#"
    SELECT s.id, s.description, s.shift_date, s.shift_time, s.status, s.created_by,
           u.full_name AS created_by_name, s.created_at, s.updated_at
    FROM shift_changes s
    JOIN users u ON u.id = s.created_by
"#;

#[derive(Clone)]
pub struct ShiftChangeRepository {
    pool: PgPool,
}

impl ShiftChangeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, include_archived: bool) -> Result<Vec<ShiftChange>, AppError> {
        let sql = format!(
            "{SELECT_SHIFT} WHERE $1 OR s.status <> 'Arquivado' ORDER BY s.shift_date DESC, s.shift_time DESC"
        );
        let entries = sqlx::query_as::<_, ShiftChange>(&sql)
            .bind(include_archived)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<ShiftChange>, AppError> {
        let sql = format!("{SELECT_SHIFT} WHERE s.id = $1");
        let entry = sqlx::query_as::<_, ShiftChange>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    pub async fn create(&self, created_by: Uuid, fields: &ShiftChangeFields) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO shift_changes (description, shift_date, shift_time, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&fields.description)
        .bind(fields.shift_date)
        .bind(fields.shift_time)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn update(&self, id: Uuid, fields: &ShiftChangeFields) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE shift_changes SET description = $2, shift_date = $3, shift_time = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&fields.description)
        .bind(fields.shift_date)
        .bind(fields.shift_time)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status(&self, id: Uuid, status: ShiftChangeStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE shift_changes SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM shift_changes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
