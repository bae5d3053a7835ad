// src/services/task_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TaskRepository, ViewRepository},
    models::{
        auth::User,
        task::{archive_cutoff, build_board, AutoArchiveReport, Task, TaskBoard, TaskCard, TaskComment, TaskFields, TaskStatus},
        views::{check_visible_ratio, reconcile_views, ViewRecord, ViewTarget},
    },
};

#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
    views: ViewRepository,
    pool: PgPool,
}

impl TaskService {
    pub fn new(repo: TaskRepository, views: ViewRepository, pool: PgPool) -> Self {
        Self { repo, views, pool }
    }

    /// Quadro Kanban; as colunas saem do status de cada pendência.
    pub async fn board(&self, show_archived: bool) -> Result<TaskBoard, AppError> {
        let tasks = self.repo.list(&TaskStatus::board_columns(show_archived)).await?;
        let cards = self.cards_for(tasks).await?;
        Ok(build_board(cards, show_archived))
    }

    /// Lista simples, incluindo canceladas (fora do quadro).
    pub async fn list(&self, status: Option<TaskStatus>) -> Result<Vec<TaskCard>, AppError> {
        let statuses: Vec<TaskStatus> = status.into_iter().collect();
        let tasks = self.repo.list(&statuses).await?;
        self.cards_for(tasks).await
    }

    pub async fn get(&self, id: Uuid) -> Result<TaskCard, AppError> {
        let task = self.find(id).await?;
        let mut cards = self.cards_for(vec![task]).await?;
        cards.pop().ok_or_else(|| AppError::ResourceNotFound("task".into()))
    }

    async fn cards_for(&self, tasks: Vec<Task>) -> Result<Vec<TaskCard>, AppError> {
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let counts = self.repo.comment_counts(&ids).await?;
        let mut views = self.views.list_for_many(ViewTarget::Task, &ids).await?;

        Ok(tasks
            .into_iter()
            .map(|task| TaskCard {
                comment_count: counts.get(&task.id).copied().unwrap_or(0),
                viewed_by: views.remove(&task.id).unwrap_or_default(),
                task,
            })
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Task, AppError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("task".into()))
    }

    pub async fn create(&self, user: &User, fields: &TaskFields) -> Result<Task, AppError> {
        self.repo.create(user.id, fields).await
    }

    /// Editam: quem criou, o responsável ou um coordenador.
    pub async fn update(&self, user: &User, id: Uuid, fields: &TaskFields) -> Result<Task, AppError> {
        let task = self.find(id).await?;
        if !can_edit_task(&task, user) {
            return Err(AppError::NotOwner);
        }
        self.repo
            .update_fields(id, fields)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("task".into()))
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        let task = self.find(id).await?;
        if !can_delete_task(&task, user) {
            return Err(AppError::NotOwner);
        }
        self.repo.delete(id).await?;
        Ok(())
    }

    /// Qualquer usuário move o cartão; sair de "Arquivada" é desarquivar.
    pub async fn change_status(&self, user: &User, id: Uuid, status: TaskStatus) -> Result<Task, AppError> {
        let task = self
            .repo
            .set_status(id, status)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("task".into()))?;
        tracing::debug!(task_id = %id, status = status.label(), by = %user.id, "Status da pendência alterado.");
        Ok(task)
    }

    /// Registra a visualização e devolve o "visto por" reconciliado.
    pub async fn record_view(&self, user: &User, id: Uuid, visible_ratio: Option<f64>) -> Result<Vec<ViewRecord>, AppError> {
        check_visible_ratio(visible_ratio)?;
        self.find(id).await?;

        let viewed_at = self.views.upsert(ViewTarget::Task, id, user.id).await?;
        let stored = self.views.list_for(ViewTarget::Task, id).await?;
        let own = ViewRecord { user_id: user.id, user_name: user.full_name.clone(), viewed_at };
        Ok(reconcile_views(own, stored))
    }

    /// Arquiva as concluídas há mais de 8h. Idempotente: chamado pelo job e pela tela do quadro.
    pub async fn archive_due(&self, now: DateTime<Utc>) -> Result<AutoArchiveReport, AppError> {
        let archived_ids = self
            .repo
            .archive_concluded_before(&self.pool, archive_cutoff(now))
            .await?;

        if !archived_ids.is_empty() {
            tracing::info!(count = archived_ids.len(), "📦 Pendências concluídas arquivadas automaticamente.");
        }

        Ok(AutoArchiveReport { archived_ids, checked_at: now })
    }

    // ---
    // Comentários
    // ---

    pub async fn list_comments(&self, task_id: Uuid) -> Result<Vec<TaskComment>, AppError> {
        self.find(task_id).await?;
        self.repo.list_comments(task_id).await
    }

    pub async fn add_comment(&self, user: &User, task_id: Uuid, body: &str) -> Result<TaskComment, AppError> {
        self.find(task_id).await?;
        self.repo.add_comment(task_id, user.id, body.trim()).await
    }

    pub async fn update_comment(&self, user: &User, comment_id: Uuid, body: &str) -> Result<TaskComment, AppError> {
        self.own_comment(user, comment_id).await?;
        self.repo
            .update_comment(comment_id, body.trim())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("comment".into()))
    }

    pub async fn delete_comment(&self, user: &User, comment_id: Uuid) -> Result<(), AppError> {
        self.own_comment(user, comment_id).await?;
        self.repo.delete_comment(comment_id).await?;
        Ok(())
    }

    // Comentário só é alterado pelo próprio autor
    async fn own_comment(&self, user: &User, comment_id: Uuid) -> Result<TaskComment, AppError> {
        let comment = self
            .repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("comment".into()))?;
        if comment.author_id != user.id {
            return Err(AppError::NotOwner);
        }
        Ok(comment)
    }
}

fn can_edit_task(task: &Task, user: &User) -> bool {
    task.creator_id == user.id || task.assignee_id == Some(user.id) || user.is_coordinator()
}

fn can_delete_task(task: &Task, user: &User) -> bool {
    task.creator_id == user.id || user.is_coordinator()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{auth::UserRole, task::TaskPriority};

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "fulano@empresa.com.br".into(),
            full_name: "Fulano".into(),
            registration: None,
            role,
            avatar_url: None,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task_by(creator: &User, assignee: Option<&User>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Configurar VPN".into(),
            description: None,
            due_date: None,
            assignee_id: assignee.map(|u| u.id),
            priority: TaskPriority::Alta,
            status: TaskStatus::Aberta,
            creator_id: creator.id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn assignee_can_edit_but_not_delete() {
        let (creator, assignee) = (user(UserRole::Usuario), user(UserRole::Usuario));
        let task = task_by(&creator, Some(&assignee));
        assert!(can_edit_task(&task, &assignee));
        assert!(!can_delete_task(&task, &assignee));
        assert!(can_delete_task(&task, &creator));
    }

    #[test]
    fn coordinator_can_edit_and_delete_any_task() {
        let creator = user(UserRole::Usuario);
        let coordinator = user(UserRole::Coordenador);
        let task = task_by(&creator, None);
        assert!(can_edit_task(&task, &coordinator));
        assert!(can_delete_task(&task, &coordinator));
    }

    #[test]
    fn unrelated_user_cannot_edit() {
        let task = task_by(&user(UserRole::Usuario), None);
        assert!(!can_edit_task(&task, &user(UserRole::Usuario)));
    }
}
