// src/db/category_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{on_unique_violation, AppError},
    models::category::{Category, FieldDefinition, FieldDefinitionInput},
};

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";
const FIELD_COLUMNS: &str = "id, category_id, key_name, label, field_type, options, is_required, position";

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC");
        let categories = sqlx::query_as::<_, Category>(&sql).fetch_all(&self.pool).await?;
        Ok(categories)
    }

    pub async fn find_category<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(name)
            .bind(description)
            .fetch_one(executor)
            .await
            .map_err(|e| on_unique_violation(e, || AppError::CategoryNameAlreadyExists(name.to_string())))?;
        Ok(category)
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE categories SET name = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(executor)
            .await
            .map_err(|e| on_unique_violation(e, || AppError::CategoryNameAlreadyExists(name.to_string())))?;
        Ok(category)
    }

    pub async fn count_assets(&self, id: Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE category_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  DEFINIÇÕES DE CAMPOS (O Molde)
    // =========================================================================

    /// Campos na ordem de exibição do formulário
    pub async fn list_fields<'e, E>(&self, executor: E, category_id: Uuid) -> Result<Vec<FieldDefinition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {FIELD_COLUMNS} FROM category_fields WHERE category_id = $1 ORDER BY position ASC");
        let fields = sqlx::query_as::<_, FieldDefinition>(&sql)
            .bind(category_id)
            .fetch_all(executor)
            .await?;
        Ok(fields)
    }

    pub async fn delete_fields<'e, E>(&self, executor: E, category_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM category_fields WHERE category_id = $1")
            .bind(category_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn insert_field<'e, E>(
        &self,
        executor: E,
        category_id: Uuid,
        position: i32,
        field: &FieldDefinitionInput,
    ) -> Result<FieldDefinition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO category_fields (category_id, key_name, label, field_type, options, is_required, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {FIELD_COLUMNS}"
        );
        let definition = sqlx::query_as::<_, FieldDefinition>(&sql)
            .bind(category_id)
            .bind(&field.key_name)
            .bind(&field.label)
            .bind(field.field_type)
            .bind(&field.options)
            .bind(field.is_required)
            .bind(position)
            .fetch_one(executor)
            .await?;
        Ok(definition)
    }
}
