// src/db/password_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::password::{PasswordEntry, PasswordFields},
};

const ENTRY_COLUMNS: &str = "id, title, username, secret, url, notes, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct PasswordRepository {
    pool: PgPool,
}

impl PasswordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<PasswordEntry>, AppError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM password_entries ORDER BY title ASC");
        let entries = sqlx::query_as::<_, PasswordEntry>(&sql).fetch_all(&self.pool).await?;
        Ok(entries)
    }

    pub async fn create(&self, created_by: Uuid, fields: &PasswordFields) -> Result<PasswordEntry, AppError> {
        let sql = format!(
            "INSERT INTO password_entries (title, username, secret, url, notes, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ENTRY_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, PasswordEntry>(&sql)
            .bind(&fields.title)
            .bind(&fields.username)
            .bind(&fields.secret)
            .bind(&fields.url)
            .bind(&fields.notes)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(entry)
    }

    pub async fn update(&self, id: Uuid, fields: &PasswordFields) -> Result<Option<PasswordEntry>, AppError> {
        let sql = format!(
            "UPDATE password_entries
             SET title = $2, username = $3, secret = $4, url = $5, notes = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {ENTRY_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, PasswordEntry>(&sql)
            .bind(id)
            .bind(&fields.title)
            .bind(&fields.username)
            .bind(&fields.secret)
            .bind(&fields.url)
            .bind(&fields.notes)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM password_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
