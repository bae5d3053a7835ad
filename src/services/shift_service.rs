// src/services/shift_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ShiftChangeRepository, ViewRepository},
    models::{
        auth::User,
        shift_change::{ShiftChange, ShiftChangeEntry, ShiftChangeFields, ShiftChangeStatus},
        views::{check_visible_ratio, reconcile_views, ViewRecord, ViewTarget},
    },
};

#[derive(Clone)]
pub struct ShiftChangeService {
    repo: ShiftChangeRepository,
    views: ViewRepository,
}

impl ShiftChangeService {
    pub fn new(repo: ShiftChangeRepository, views: ViewRepository) -> Self {
        Self { repo, views }
    }

    pub async fn list(&self, include_archived: bool) -> Result<Vec<ShiftChangeEntry>, AppError> {
        let entries = self.repo.list(include_archived).await?;
        let ids: Vec<Uuid> = entries.iter().map(|s| s.id).collect();
        let mut views = self.views.list_for_many(ViewTarget::ShiftChange, &ids).await?;

        Ok(entries
            .into_iter()
            .map(|shift_change| ShiftChangeEntry {
                viewed_by: views.remove(&shift_change.id).unwrap_or_default(),
                shift_change,
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<ShiftChangeEntry, AppError> {
        let shift_change = self.find(id).await?;
        let viewed_by = self.views.list_for(ViewTarget::ShiftChange, id).await?;
        Ok(ShiftChangeEntry { shift_change, viewed_by })
    }

    async fn find(&self, id: Uuid) -> Result<ShiftChange, AppError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("shift_change".into()))
    }

    /// Registros entram direto como "Aprovado".
    pub async fn create(&self, user: &User, fields: &ShiftChangeFields) -> Result<ShiftChange, AppError> {
        let fields = ShiftChangeFields { description: fields.description.trim().to_string(), ..fields.clone() };
        let id = self.repo.create(user.id, &fields).await?;
        self.find(id).await
    }

    pub async fn update(&self, user: &User, id: Uuid, fields: &ShiftChangeFields) -> Result<ShiftChange, AppError> {
        self.owned(user, id).await?;
        let fields = ShiftChangeFields { description: fields.description.trim().to_string(), ..fields.clone() };
        self.repo.update(id, &fields).await?;
        self.find(id).await
    }

    /// Arquivar e desarquivar: só quem criou ou um coordenador.
    pub async fn set_archived(&self, user: &User, id: Uuid, archived: bool) -> Result<ShiftChange, AppError> {
        self.owned(user, id).await?;
        let status = if archived { ShiftChangeStatus::Arquivado } else { ShiftChangeStatus::Aprovado };
        self.repo.set_status(id, status).await?;
        self.find(id).await
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        self.owned(user, id).await?;
        self.repo.delete(id).await?;
        Ok(())
    }

    pub async fn record_view(&self, user: &User, id: Uuid, visible_ratio: Option<f64>) -> Result<Vec<ViewRecord>, AppError> {
        check_visible_ratio(visible_ratio)?;
        self.find(id).await?;

        let viewed_at = self.views.upsert(ViewTarget::ShiftChange, id, user.id).await?;
        let stored = self.views.list_for(ViewTarget::ShiftChange, id).await?;
        let own = ViewRecord { user_id: user.id, user_name: user.full_name.clone(), viewed_at };
        Ok(reconcile_views(own, stored))
    }

    async fn owned(&self, user: &User, id: Uuid) -> Result<ShiftChange, AppError> {
        let entry = self.find(id).await?;
        if entry.created_by != user.id && !user.is_coordinator() {
            return Err(AppError::NotOwner);
        }
        Ok(entry)
    }
}
