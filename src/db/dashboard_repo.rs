// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::StatusCount};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn assets_by_status(&self) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, StatusCount>(
            "SELECT status::text AS status, COUNT(*) AS total FROM assets GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Só o que ainda está em aberto no quadro
    pub async fn open_tasks_by_status(&self) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, StatusCount>(
            "SELECT status::text AS status, COUNT(*) AS total FROM tasks
             WHERE status IN ('Aberta', 'Em Andamento')
             GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn pending_leave_requests(&self, owner: Option<Uuid>) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM leave_requests
             WHERE status = 'Pendente' AND ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn unseen_shift_changes(&self, user_id: Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shift_changes s
             WHERE s.status = 'Aprovado'
               AND NOT EXISTS (
                   SELECT 1 FROM shift_change_views v
                   WHERE v.shift_change_id = s.id AND v.user_id = $1
               )",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
