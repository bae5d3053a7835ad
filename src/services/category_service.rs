// src/services/category_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CategoryRepository,
    models::category::{check_field_definitions, Category, CategoryPayload, CategorySchema, FieldDefinition, FieldDefinitionInput},
};

#[derive(Clone)]
pub struct CategoryService {
    repo: CategoryRepository,
    pool: PgPool,
}

impl CategoryService {
    pub fn new(repo: CategoryRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories().await
    }

    /// Categoria + molde, usado pelo formulário de ativos.
    pub async fn get_schema(&self, id: Uuid) -> Result<CategorySchema, AppError> {
        let category = self
            .repo
            .find_category(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("category".into()))?;
        let fields = self.repo.list_fields(&self.pool, id).await?;
        Ok(CategorySchema { category, fields })
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<CategorySchema, AppError> {
        check_field_definitions(&payload.fields)?;

        let mut tx = self.pool.begin().await?;

        let category = self
            .repo
            .create_category(&mut *tx, payload.name.trim(), description_of(payload))
            .await?;
        let fields = self.write_fields(&mut tx, category.id, payload).await?;

        tx.commit().await?;

        tracing::info!(category = %category.name, fields = fields.len(), "🗂️ Categoria criada.");
        Ok(CategorySchema { category, fields })
    }

    /// Atualiza nome e descrição e troca o molde inteiro na mesma transação.
    pub async fn update_category(&self, id: Uuid, payload: &CategoryPayload) -> Result<CategorySchema, AppError> {
        check_field_definitions(&payload.fields)?;

        let mut tx = self.pool.begin().await?;

        let category = self
            .repo
            .update_category(&mut *tx, id, payload.name.trim(), description_of(payload))
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("category".into()))?;

        self.repo.delete_fields(&mut *tx, id).await?;
        let fields = self.write_fields(&mut tx, id, payload).await?;

        tx.commit().await?;
        Ok(CategorySchema { category, fields })
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        let category = self
            .repo
            .find_category(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("category".into()))?;

        if self.repo.count_assets(id).await? > 0 {
            return Err(AppError::CategoryInUse(category.name));
        }

        self.repo.delete_category(id).await?;
        Ok(())
    }

    async fn write_fields(
        &self,
        tx: &mut sqlx::Transaction<'static, sqlx::Postgres>,
        category_id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<Vec<FieldDefinition>, AppError> {
        let mut fields = Vec::with_capacity(payload.fields.len());
        for (position, field) in payload.fields.iter().enumerate() {
            let field = FieldDefinitionInput {
                key_name: field.key_name.trim().to_string(),
                label: field.label.trim().to_string(),
                ..field.clone()
            };
            fields.push(self.repo.insert_field(&mut **tx, category_id, position as i32, &field).await?);
        }
        Ok(fields)
    }
}

fn description_of(payload: &CategoryPayload) -> Option<&str> {
    payload.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
}
