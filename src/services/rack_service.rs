// src/services/rack_service.rs

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RackRepository,
    models::rack::{
        assign_item_ids, check_position_capacity, checked_next_levels, generate_addresses, group_by_level, parse_position_names, Address, AddressItem,
        ItemLocation, Rack, RackLayout,
    },
};

// Toda mutação de estrutura roda numa transação: ou aplica tudo, ou nada.
#[derive(Clone)]
pub struct RackService {
    repo: RackRepository,
    pool: PgPool,
}

impl RackService {
    pub fn new(repo: RackRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_racks(&self) -> Result<Vec<Rack>, AppError> {
        self.repo.list_racks().await
    }

    pub async fn get_layout(&self, rack_id: Uuid) -> Result<RackLayout, AppError> {
        let rack = self
            .repo
            .find_rack(&self.pool, rack_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("rack".into()))?;
        self.layout_of(rack).await
    }

    async fn layout_of(&self, rack: Rack) -> Result<RackLayout, AppError> {
        let addresses = self.repo.list_addresses(rack.id).await?;
        Ok(RackLayout { rack, structure: group_by_level(addresses) })
    }

    /// Cria o rack e gera `levels × positions_per_level` endereços.
    pub async fn create_rack(&self, name: &str, levels: i32, positions_per_level: i32) -> Result<RackLayout, AppError> {
        let mut tx = self.pool.begin().await?;

        let rack = self
            .repo
            .create_rack(&mut *tx, name.trim(), levels, positions_per_level)
            .await?;

        let level_numbers: Vec<i32> = (1..=levels).collect();
        let generated = generate_addresses(&level_numbers, positions_per_level as u32);
        self.repo.insert_addresses(&mut *tx, rack.id, &generated).await?;

        tx.commit().await?;

        tracing::info!(rack = %rack.name, addresses = generated.len(), "🗄️ Rack criado.");
        self.layout_of(rack).await
    }

    pub async fn add_levels(&self, rack_id: Uuid, count: i32) -> Result<RackLayout, AppError> {
        let mut tx = self.pool.begin().await?;

        let rack = self.lock(&mut tx, rack_id).await?;
        let existing = self.repo.existing_levels(&mut *tx, rack_id).await?;
        let new_levels = checked_next_levels(&existing, count as u32)?;

        let generated = generate_addresses(&new_levels, rack.positions_per_level as u32);
        self.repo.insert_addresses(&mut *tx, rack_id, &generated).await?;

        let rack = self.repo.recount_levels(&mut *tx, rack_id).await?;

        tx.commit().await?;
        self.layout_of(rack).await
    }

    /// Insere só as posições que ainda não existem no nível; devolve as criadas.
    /// Aceita lista ou texto separado por vírgulas.
    pub async fn add_positions(&self, rack_id: Uuid, level: i32, raw_names: &[String]) -> Result<Vec<Address>, AppError> {
        let names = parse_position_names(raw_names);
        if names.is_empty() {
            return Err(AppError::EmptySelection);
        }

        let mut tx = self.pool.begin().await?;

        self.lock(&mut tx, rack_id).await?;
        let existing: HashSet<String> = self.repo.names_at_level(&mut *tx, rack_id, level).await?.into_iter().collect();

        let to_insert: Vec<(i32, String)> = names
            .into_iter()
            .filter(|name| !existing.contains(name))
            .map(|name| (level, name))
            .collect();
        check_position_capacity(level, existing.len(), to_insert.len())?;

        if to_insert.is_empty() {
            tx.commit().await?;
            return Ok(Vec::new());
        }

        let inserted = self.repo.insert_addresses(&mut *tx, rack_id, &to_insert).await?;
        // Um nível novo também conta em `levels`
        self.repo.recount_levels(&mut *tx, rack_id).await?;

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn remove_levels(&self, rack_id: Uuid, levels: &[i32], confirm: bool) -> Result<Rack, AppError> {
        check_confirmed_selection(confirm, levels.len())?;

        let mut tx = self.pool.begin().await?;
        self.lock(&mut tx, rack_id).await?;

        let removed = self.repo.delete_levels(&mut *tx, rack_id, levels).await?;
        let rack = self.repo.recount_levels(&mut *tx, rack_id).await?;

        tx.commit().await?;
        tracing::info!(rack = %rack.name, removed, "Níveis removidos.");
        Ok(rack)
    }

    pub async fn remove_positions(
        &self,
        rack_id: Uuid,
        level: i32,
        names: &[String],
        confirm: bool,
    ) -> Result<Rack, AppError> {
        check_confirmed_selection(confirm, names.len())?;

        let mut tx = self.pool.begin().await?;
        self.lock(&mut tx, rack_id).await?;

        self.repo.delete_positions(&mut *tx, rack_id, level, names).await?;
        let rack = self.repo.recount_levels(&mut *tx, rack_id).await?;

        tx.commit().await?;
        Ok(rack)
    }

    /// Remove endereços e o rack na mesma transação.
    pub async fn delete_rack(&self, rack_id: Uuid, confirm: bool) -> Result<(), AppError> {
        if !confirm {
            return Err(AppError::ConfirmationRequired);
        }

        let mut tx = self.pool.begin().await?;
        self.lock(&mut tx, rack_id).await?;

        let addresses = self.repo.delete_all_addresses(&mut *tx, rack_id).await?;
        self.repo.delete_rack(&mut *tx, rack_id).await?;

        tx.commit().await?;
        tracing::info!(%rack_id, addresses, "Rack excluído.");
        Ok(())
    }

    pub async fn update_address(
        &self,
        address_id: Uuid,
        items: Vec<AddressItem>,
        observation: Option<&str>,
    ) -> Result<Address, AppError> {
        let observation = observation.map(str::trim).filter(|o| !o.is_empty());
        self.repo
            .update_address(address_id, assign_item_ids(items), observation)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("address".into()))
    }

    pub async fn search_items(&self, query: &str) -> Result<Vec<ItemLocation>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.search_items(query).await
    }

    async fn lock(&self, tx: &mut sqlx::Transaction<'static, sqlx::Postgres>, rack_id: Uuid) -> Result<Rack, AppError> {
        self.repo
            .lock_rack(&mut **tx, rack_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("rack".into()))
    }
}

/// Remoções exigem confirmação explícita e ao menos um item selecionado.
fn check_confirmed_selection(confirm: bool, selected: usize) -> Result<(), AppError> {
    if !confirm {
        return Err(AppError::ConfirmationRequired);
    }
    if selected == 0 {
        return Err(AppError::EmptySelection);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_requires_confirmation_first() {
        assert!(matches!(check_confirmed_selection(false, 3), Err(AppError::ConfirmationRequired)));
        assert!(matches!(check_confirmed_selection(true, 0), Err(AppError::EmptySelection)));
        assert!(check_confirmed_selection(true, 1).is_ok());
    }
}
