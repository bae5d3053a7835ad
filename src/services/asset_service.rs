// src/services/asset_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssetRepository, CategoryRepository},
    models::{
        asset::{Asset, AssetDetail, AssetFields, AssetFilter, AssetStatus, AssetStatusPayload},
        auth::User,
        category::CategorySchema,
    },
};

// Fluxos de duas etapas (status + registro) rodam numa transação só.
#[derive(Clone)]
pub struct AssetService {
    repo: AssetRepository,
    categories: CategoryRepository,
    pool: PgPool,
}

impl AssetService {
    pub fn new(repo: AssetRepository, categories: CategoryRepository, pool: PgPool) -> Self {
        Self { repo, categories, pool }
    }

    pub async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<AssetDetail, AppError> {
        let asset = self
            .repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("asset".into()))?;
        let maintenance = self.repo.list_maintenance(id).await?;
        Ok(AssetDetail { asset, maintenance })
    }

    pub async fn find_by_serial(&self, serial_number: &str) -> Result<Asset, AppError> {
        self.repo
            .find_by_serial(serial_number.trim())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("asset".into()))
    }

    pub async fn create(&self, fields: &AssetFields) -> Result<Asset, AppError> {
        let fields = normalized(fields);
        let mut tx = self.pool.begin().await?;

        self.schema_in_tx(&mut tx, fields.category_id).await?.validate_metadata(&fields.metadata)?;
        let asset = self.repo.create(&mut *tx, &fields).await?;

        tx.commit().await?;
        tracing::info!(serial = %asset.serial_number, "💻 Ativo cadastrado.");
        Ok(asset)
    }

    pub async fn update(&self, id: Uuid, fields: &AssetFields) -> Result<Asset, AppError> {
        let fields = normalized(fields);
        let mut tx = self.pool.begin().await?;

        self.lock(&mut tx, id).await?;
        self.schema_in_tx(&mut tx, fields.category_id).await?.validate_metadata(&fields.metadata)?;
        let asset = self
            .repo
            .update(&mut *tx, id, &fields)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("asset".into()))?;

        tx.commit().await?;
        Ok(asset)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("asset".into()));
        }
        Ok(())
    }

    /// Só estoque e uso por aqui; manutenção e descarte têm rotas próprias.
    pub async fn change_status(&self, id: Uuid, payload: &AssetStatusPayload) -> Result<Asset, AppError> {
        let mut tx = self.pool.begin().await?;
        let asset = self.lock(&mut tx, id).await?;

        let target = payload.status;
        if !matches!(target, AssetStatus::EmEstoque | AssetStatus::EmUso) {
            return Err(invalid_transition(asset.status, target));
        }
        check_transition(asset.status, target)?;

        // Sair da manutenção fecha o registro aberto
        if asset.status == AssetStatus::EmManutencao {
            self.repo.close_maintenance(&mut *tx, id, None).await?;
        }

        let (holder_name, holder_registration) = match target {
            AssetStatus::EmUso => (
                clean(payload.holder_name.as_deref()).or(asset.holder_name.as_deref()),
                clean(payload.holder_registration.as_deref()).or(asset.holder_registration.as_deref()),
            ),
            _ => (None, None),
        };

        let updated = self
            .repo
            .set_status(&mut *tx, id, target, holder_name, holder_registration)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Status "Em manutenção" + abertura do registro.
    pub async fn send_to_maintenance(&self, user: &User, id: Uuid, description: &str) -> Result<AssetDetail, AppError> {
        let mut tx = self.pool.begin().await?;
        let asset = self.lock(&mut tx, id).await?;
        check_transition(asset.status, AssetStatus::EmManutencao)?;

        self.repo
            .set_status(
                &mut *tx,
                id,
                AssetStatus::EmManutencao,
                asset.holder_name.as_deref(),
                asset.holder_registration.as_deref(),
            )
            .await?;
        self.repo.open_maintenance(&mut *tx, id, description.trim(), user.id).await?;

        tx.commit().await?;
        tracing::info!(serial = %asset.serial_number, "🔧 Ativo enviado para manutenção.");
        self.get(id).await
    }

    /// Fecha o registro e devolve o ativo ao estoque.
    pub async fn finish_maintenance(&self, id: Uuid, resolution: Option<&str>) -> Result<AssetDetail, AppError> {
        let mut tx = self.pool.begin().await?;
        let asset = self.lock(&mut tx, id).await?;
        if asset.status != AssetStatus::EmManutencao {
            return Err(invalid_transition(asset.status, AssetStatus::EmEstoque));
        }

        self.repo.close_maintenance(&mut *tx, id, clean(resolution)).await?;
        self.repo.set_status(&mut *tx, id, AssetStatus::EmEstoque, None, None).await?;

        tx.commit().await?;
        self.get(id).await
    }

    pub async fn decommission(&self, user: &User, id: Uuid, reason: &str) -> Result<Asset, AppError> {
        let mut tx = self.pool.begin().await?;
        let asset = self.lock(&mut tx, id).await?;
        check_transition(asset.status, AssetStatus::Descartado)?;

        if asset.status == AssetStatus::EmManutencao {
            self.repo.close_maintenance(&mut *tx, id, Some(reason.trim())).await?;
        }
        let updated = self.repo.decommission(&mut *tx, id, reason.trim(), user.id).await?;

        tx.commit().await?;
        tracing::info!(serial = %updated.serial_number, by = %user.id, "🗑️ Ativo descartado.");
        Ok(updated)
    }

    async fn lock(&self, tx: &mut Transaction<'static, Postgres>, id: Uuid) -> Result<Asset, AppError> {
        self.repo
            .lock(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("asset".into()))
    }

    async fn schema_in_tx(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        category_id: Uuid,
    ) -> Result<CategorySchema, AppError> {
        let category = self
            .categories
            .find_category(&mut **tx, category_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("category".into()))?;
        let fields = self.categories.list_fields(&mut **tx, category_id).await?;
        Ok(CategorySchema { category, fields })
    }
}

fn invalid_transition(from: AssetStatus, to: AssetStatus) -> AppError {
    AppError::InvalidTransition { from: from.label().to_string(), to: to.label().to_string() }
}

fn check_transition(from: AssetStatus, to: AssetStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) { Ok(()) } else { Err(invalid_transition(from, to)) }
}

fn clean(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn normalized(fields: &AssetFields) -> AssetFields {
    AssetFields {
        serial_number: fields.serial_number.trim().to_string(),
        description: clean(fields.description.as_deref()).map(str::to_string),
        holder_name: clean(fields.holder_name.as_deref()).map(str::to_string),
        holder_registration: clean(fields.holder_registration.as_deref()).map(str::to_string),
        ..fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_transition_names_both_labels() {
        let err = check_transition(AssetStatus::Descartado, AssetStatus::EmUso).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { ref from, ref to } if from == "Descartado" && to == "Em uso"
        ));
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let fields = AssetFields {
            category_id: Uuid::nil(),
            serial_number: "  ABC123 ".into(),
            description: Some("   ".into()),
            holder_name: Some(" Ana ".into()),
            holder_registration: None,
            metadata: serde_json::json!({}),
        };
        let clean = normalized(&fields);
        assert_eq!(clean.serial_number, "ABC123");
        assert_eq!(clean.description, None);
        assert_eq!(clean.holder_name.as_deref(), Some("Ana"));
    }
}
