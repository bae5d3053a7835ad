// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{auth::User, dashboard::DashboardSummary},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    /// Contadores da página inicial; solicitações pendentes seguem a mesma visibilidade da listagem.
    pub async fn summary(&self, user: &User) -> Result<DashboardSummary, AppError> {
        let owner = (!user.is_coordinator()).then_some(user.id);

        let (assets_by_status, open_tasks_by_status, pending_leave_requests, unseen_shift_changes) = tokio::try_join!(
            self.repo.assets_by_status(),
            self.repo.open_tasks_by_status(),
            self.repo.pending_leave_requests(owner),
            self.repo.unseen_shift_changes(user.id),
        )?;

        Ok(DashboardSummary { assets_by_status, open_tasks_by_status, pending_leave_requests, unseen_shift_changes })
    }
}
