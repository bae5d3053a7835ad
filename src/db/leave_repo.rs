// src/db/leave_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::leave::{LeaveKind, LeavePeriod, LeaveRequest, RequestStatus},
};

const SELECT_LEAVE: &str = r#"
    SELECT l.id, l.user_id, u.full_name AS user_name, l.kind, l.start_date, l.end_date, l.days,
           l.reason, l.status, l.reviewed_by, l.reviewed_at, l.review_note, l.created_at, l.updated_at
    FROM leave_requests l
    JOIN users u ON u.id = l.user_id
"#;

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `owner = None` lista de todos (visão do coordenador).
    pub async fn list(&self, owner: Option<Uuid>, include_archived: bool) -> Result<Vec<LeaveRequest>, AppError> {
        let sql = format!(
            "{SELECT_LEAVE}
             WHERE ($1::uuid IS NULL OR l.user_id = $1)
               AND ($2 OR l.status <> 'Arquivado')
             ORDER BY l.start_date DESC"
        );
        let requests = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(owner)
            .bind(include_archived)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<LeaveRequest>, AppError> {
        let sql = format!("{SELECT_LEAVE} WHERE l.id = $1");
        let request = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        kind: LeaveKind,
        period: LeavePeriod,
        reason: Option<&str>,
    ) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO leave_requests (user_id, kind, start_date, end_date, days, reason)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(user_id)
        .bind(kind)
        .bind(period.start_date)
        .bind(period.end_date)
        .bind(period.days)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn update_period(
        &self,
        id: Uuid,
        kind: LeaveKind,
        period: LeavePeriod,
        reason: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE leave_requests
             SET kind = $2, start_date = $3, end_date = $4, days = $5, reason = $6, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(kind)
        .bind(period.start_date)
        .bind(period.end_date)
        .bind(period.days)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Aprovação/rejeição: grava quem revisou e quando.
    pub async fn review(
        &self,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
        note: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE leave_requests
             SET status = $2, reviewed_by = $3, reviewed_at = NOW(), review_note = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .bind(note)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status(&self, id: Uuid, status: RequestStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE leave_requests SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
