// src/db/task_repo.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::task::{Task, TaskComment, TaskFields, TaskStatus},
};

const TASK_COLUMNS: &str =
    "id, title, description, due_date, assignee_id, priority, status, creator_id, created_at, updated_at";

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pendências nos status pedidos (todas, quando `statuses` está vazio).
    pub async fn list(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE cardinality($1::text[]) = 0 OR status::text = ANY($1)
             ORDER BY due_date ASC NULLS LAST, created_at DESC"
        );
        let labels: Vec<&str> = statuses.iter().map(|s| s.label()).collect();
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(labels)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn create(&self, creator_id: Uuid, fields: &TaskFields) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, due_date, assignee_id, priority, creator_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.due_date)
            .bind(fields.assignee_id)
            .bind(fields.priority)
            .bind(creator_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn update_fields(&self, id: Uuid, fields: &TaskFields) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks
             SET title = $2, description = $3, due_date = $4, assignee_id = $5, priority = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.due_date)
            .bind(fields.assignee_id)
            .bind(fields.priority)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    // Toda mudança de status renova o updated_at (base do arquivamento automático)
    pub async fn set_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>, AppError> {
        let sql = format!("UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {TASK_COLUMNS}");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Arquiva em lote as concluídas cujo updated_at é anterior ao corte.
    pub async fn archive_concluded_before<'e, E>(&self, executor: E, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "UPDATE tasks SET status = 'Arquivada', updated_at = NOW()
             WHERE status = 'Concluída' AND updated_at <= $1
             RETURNING id",
        )
        .bind(cutoff)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    // ---
    // Comentários
    // ---

    pub async fn comment_counts(&self, task_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, AppError> {
        if task_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT task_id, COUNT(*) FROM task_comments WHERE task_id = ANY($1) GROUP BY task_id",
        )
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn list_comments(&self, task_id: Uuid) -> Result<Vec<TaskComment>, AppError> {
        let comments = sqlx::query_as::<_, TaskComment>(
            r#"
            SELECT c.id, c.task_id, c.author_id, u.full_name AS author_name, c.body, c.created_at, c.updated_at
            FROM task_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn find_comment(&self, comment_id: Uuid) -> Result<Option<TaskComment>, AppError> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            SELECT c.id, c.task_id, c.author_id, u.full_name AS author_name, c.body, c.created_at, c.updated_at
            FROM task_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    pub async fn add_comment(&self, task_id: Uuid, author_id: Uuid, body: &str) -> Result<TaskComment, AppError> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            WITH c AS (
                INSERT INTO task_comments (task_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT c.id, c.task_id, c.author_id, u.full_name AS author_name, c.body, c.created_at, c.updated_at
            FROM c JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(task_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    pub async fn update_comment(&self, comment_id: Uuid, body: &str) -> Result<Option<TaskComment>, AppError> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            WITH c AS (
                UPDATE task_comments SET body = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT c.id, c.task_id, c.author_id, u.full_name AS author_name, c.body, c.created_at, c.updated_at
            FROM c JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(comment_id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM task_comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
