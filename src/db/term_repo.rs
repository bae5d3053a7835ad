// src/db/term_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::term::IssuedTerm};

const ISSUED_COLUMNS: &str = "id, term_number, template_id, asset_id, holder_name, holder_registration, \
     serial_number, issued_by, issued_at";

// Dados gravados ao emitir um termo
pub struct NewIssuedTerm<'a> {
    pub term_number: i64,
    pub template_id: &'a str,
    pub asset_id: Option<Uuid>,
    pub holder_name: &'a str,
    pub holder_registration: Option<&'a str>,
    pub serial_number: &'a str,
    pub issued_by: Uuid,
}

#[derive(Clone)]
pub struct TermRepository {
    pool: PgPool,
}

impl TermRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn next_term_number<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number: i64 = sqlx::query_scalar("SELECT nextval('term_number_seq')")
            .fetch_one(executor)
            .await?;
        Ok(number)
    }

    pub async fn record_issue<'e, E>(&self, executor: E, term: NewIssuedTerm<'_>) -> Result<IssuedTerm, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO issued_terms
                (term_number, template_id, asset_id, holder_name, holder_registration, serial_number, issued_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ISSUED_COLUMNS}"
        );
        let issued = sqlx::query_as::<_, IssuedTerm>(&sql)
            .bind(term.term_number)
            .bind(term.template_id)
            .bind(term.asset_id)
            .bind(term.holder_name)
            .bind(term.holder_registration)
            .bind(term.serial_number)
            .bind(term.issued_by)
            .fetch_one(executor)
            .await?;
        Ok(issued)
    }

    pub async fn list_issued(&self, serial_number: Option<&str>) -> Result<Vec<IssuedTerm>, AppError> {
        let sql = format!(
            "SELECT {ISSUED_COLUMNS} FROM issued_terms
             WHERE $1::text IS NULL OR serial_number = $1
             ORDER BY issued_at DESC"
        );
        let terms = sqlx::query_as::<_, IssuedTerm>(&sql)
            .bind(serial_number)
            .fetch_all(&self.pool)
            .await?;
        Ok(terms)
    }
}
