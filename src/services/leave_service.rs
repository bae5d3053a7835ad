// src/services/leave_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeaveRepository, ViewRepository},
    models::{
        auth::User,
        leave::{can_edit, can_transition, resolve_period, Actor, LeaveRequest, LeaveRequestEntry, LeaveRequestFields, RequestStatus},
        views::{check_visible_ratio, reconcile_views, ViewRecord, ViewTarget},
    },
};

#[derive(Clone)]
pub struct LeaveService {
    repo: LeaveRepository,
    views: ViewRepository,
}

fn actor_for(user: &User, request: &LeaveRequest) -> Actor {
    Actor { is_owner: request.user_id == user.id, is_coordinator: user.is_coordinator() }
}

fn clean_text(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

impl LeaveService {
    pub fn new(repo: LeaveRepository, views: ViewRepository) -> Self {
        Self { repo, views }
    }

    /// Usuário comum vê só as próprias; coordenador vê todas.
    pub async fn list(&self, user: &User, include_archived: bool) -> Result<Vec<LeaveRequestEntry>, AppError> {
        let owner = (!user.is_coordinator()).then_some(user.id);
        let requests = self.repo.list(owner, include_archived).await?;

        let ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
        let mut views = self.views.list_for_many(ViewTarget::LeaveRequest, &ids).await?;

        Ok(requests
            .into_iter()
            .map(|request| LeaveRequestEntry { viewed_by: views.remove(&request.id).unwrap_or_default(), request })
            .collect())
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<LeaveRequestEntry, AppError> {
        let request = self.visible(user, id).await?;
        let viewed_by = self.views.list_for(ViewTarget::LeaveRequest, id).await?;
        Ok(LeaveRequestEntry { request, viewed_by })
    }

    async fn find(&self, id: Uuid) -> Result<LeaveRequest, AppError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("leave_request".into()))
    }

    // Solicitação de outro usuário aparece como inexistente para quem não coordena
    async fn visible(&self, user: &User, id: Uuid) -> Result<LeaveRequest, AppError> {
        let request = self.find(id).await?;
        if request.user_id != user.id && !user.is_coordinator() {
            return Err(AppError::ResourceNotFound("leave_request".into()));
        }
        Ok(request)
    }

    pub async fn create(&self, user: &User, fields: &LeaveRequestFields) -> Result<LeaveRequest, AppError> {
        let period = resolve_period(fields.kind, fields.start_date, fields.end_date, fields.days)?;
        let id = self
            .repo
            .create(user.id, fields.kind, period, clean_text(fields.reason.as_deref()))
            .await?;
        tracing::info!(request_id = %id, user_id = %user.id, days = period.days, "Solicitação de ausência registrada.");
        self.find(id).await
    }

    pub async fn update(&self, user: &User, id: Uuid, fields: &LeaveRequestFields) -> Result<LeaveRequest, AppError> {
        let request = self.visible(user, id).await?;
        if !can_edit(request.status, actor_for(user, &request)) {
            return Err(AppError::NotOwner);
        }
        let period = resolve_period(fields.kind, fields.start_date, fields.end_date, fields.days)?;
        self.repo
            .update_period(id, fields.kind, period, clean_text(fields.reason.as_deref()))
            .await?;
        self.find(id).await
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        let request = self.visible(user, id).await?;
        if !can_edit(request.status, actor_for(user, &request)) {
            return Err(AppError::NotOwner);
        }
        self.repo.delete(id).await?;
        Ok(())
    }

    /// Aprovar/rejeitar grava o revisor; arquivar só muda o status.
    pub async fn transition(
        &self,
        user: &User,
        id: Uuid,
        to: RequestStatus,
        note: Option<&str>,
    ) -> Result<LeaveRequest, AppError> {
        let request = self.visible(user, id).await?;
        let actor = actor_for(user, &request);

        if !can_transition(request.status, to, actor) {
            if !actor.is_coordinator {
                return Err(AppError::CoordinatorRequired);
            }
            return Err(AppError::InvalidTransition {
                from: request.status.label().to_string(),
                to: to.label().to_string(),
            });
        }

        match to {
            RequestStatus::Aprovado | RequestStatus::Rejeitado => {
                self.repo.review(id, to, user.id, clean_text(note)).await?;
            }
            _ => {
                self.repo.set_status(id, to).await?;
            }
        }

        tracing::info!(request_id = %id, from = request.status.label(), to = to.label(), "Solicitação revisada.");
        self.find(id).await
    }

    pub async fn record_view(&self, user: &User, id: Uuid, visible_ratio: Option<f64>) -> Result<Vec<ViewRecord>, AppError> {
        check_visible_ratio(visible_ratio)?;
        self.visible(user, id).await?;

        let viewed_at = self.views.upsert(ViewTarget::LeaveRequest, id, user.id).await?;
        let stored = self.views.list_for(ViewTarget::LeaveRequest, id).await?;
        let own = ViewRecord { user_id: user.id, user_name: user.full_name.clone(), viewed_at };
        Ok(reconcile_views(own, stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(Some(" consulta médica ")), Some("consulta médica"));
        assert_eq!(clean_text(None), None);
    }
}
