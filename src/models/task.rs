// src/models/task.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::views::ViewRecord;

/// Tempo em "Concluída" até a pendência ser arquivada automaticamente.
pub const AUTO_ARCHIVE_AFTER_HOURS: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Baixa,
    #[sqlx(rename = "Média")]
    #[serde(rename = "Média")]
    Media,
    Alta,
    #[sqlx(rename = "Crítica")]
    #[serde(rename = "Crítica")]
    Critica,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    Aberta,
    #[sqlx(rename = "Em Andamento")]
    #[serde(rename = "Em Andamento")]
    EmAndamento,
    #[sqlx(rename = "Concluída")]
    #[serde(rename = "Concluída")]
    Concluida,
    Cancelada,
    Arquivada,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Aberta => "Aberta",
            TaskStatus::EmAndamento => "Em Andamento",
            TaskStatus::Concluida => "Concluída",
            TaskStatus::Cancelada => "Cancelada",
            TaskStatus::Arquivada => "Arquivada",
        }
    }

    /// Colunas do quadro, na ordem de exibição.
    pub fn board_columns(show_archived: bool) -> Vec<TaskStatus> {
        let mut columns = vec![TaskStatus::Aberta, TaskStatus::EmAndamento, TaskStatus::Concluida];
        if show_archived {
            columns.push(TaskStatus::Arquivada);
        }
        columns
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    #[schema(example = "Trocar toner da impressora do 2º andar")]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_due_for_archive(&self, now: DateTime<Utc>) -> bool {
        is_due_for_archive(self.status, self.updated_at, now)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Campos editáveis da pendência (criação e edição completa)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    #[validate(
        length(max = 200, message = "O título deve ter até 200 caracteres."),
        custom(function = "crate::common::validation::not_blank", message = "O título é obrigatório.")
    )]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Media
}

// Cartão do quadro: a pendência com quem já a visualizou
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    #[serde(flatten)]
    pub task: Task,
    pub comment_count: i64,
    pub viewed_by: Vec<ViewRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<TaskCard>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskBoard {
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoArchiveReport {
    pub archived_ids: Vec<Uuid>,
    pub checked_at: DateTime<Utc>,
}

/// Instante a partir do qual uma pendência concluída já pode ser arquivada.
pub fn archive_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(AUTO_ARCHIVE_AFTER_HOURS)
}

pub fn is_due_for_archive(status: TaskStatus, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    status == TaskStatus::Concluida && updated_at <= archive_cutoff(now)
}

/// Distribui os cartões nas colunas; status fora do quadro (ex.: Cancelada) ficam de fora.
pub fn build_board(cards: Vec<TaskCard>, show_archived: bool) -> TaskBoard {
    let mut columns: Vec<BoardColumn> = TaskStatus::board_columns(show_archived)
        .into_iter()
        .map(|status| BoardColumn { status, tasks: Vec::new() })
        .collect();

    for card in cards {
        if let Some(column) = columns.iter_mut().find(|c| c.status == card.task.status) {
            column.tasks.push(card);
        }
    }

    TaskBoard { columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, updated_at: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Pendência".into(),
            description: None,
            due_date: None,
            assignee_id: None,
            priority: TaskPriority::Media,
            status,
            creator_id: Uuid::new_v4(),
            created_at: updated_at,
            updated_at,
        }
    }

    fn card(task: Task) -> TaskCard {
        TaskCard { task, comment_count: 0, viewed_by: vec![] }
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let fields = TaskFields {
            title: "    ".into(),
            description: None,
            due_date: None,
            assignee_id: None,
            priority: TaskPriority::Alta,
        };
        assert!(fields.validate().unwrap_err().field_errors().contains_key("title"));
    }

    #[test]
    fn concluded_task_older_than_eight_hours_is_due() {
        let now = Utc::now();
        assert!(task(TaskStatus::Concluida, now - Duration::hours(8)).is_due_for_archive(now));
        assert!(task(TaskStatus::Concluida, now - Duration::hours(30)).is_due_for_archive(now));
    }

    #[test]
    fn recently_concluded_task_is_not_due() {
        let now = Utc::now();
        let recent = now - Duration::hours(7) - Duration::minutes(59);
        assert!(!task(TaskStatus::Concluida, recent).is_due_for_archive(now));
    }

    #[test]
    fn only_concluded_tasks_are_archived_automatically() {
        let now = Utc::now();
        let old = now - Duration::days(3);
        for status in [TaskStatus::Aberta, TaskStatus::EmAndamento, TaskStatus::Cancelada, TaskStatus::Arquivada] {
            assert!(!task(status, old).is_due_for_archive(now));
        }
    }

    #[test]
    fn archived_tasks_only_show_when_requested() {
        let now = Utc::now();
        let cards = || vec![card(task(TaskStatus::Aberta, now)), card(task(TaskStatus::Arquivada, now))];

        let default_board = build_board(cards(), false);
        assert_eq!(default_board.columns.len(), 3);
        let total: usize = default_board.columns.iter().map(|c| c.tasks.len()).sum();
        assert_eq!(total, 1);

        let full_board = build_board(cards(), true);
        let archived = full_board.columns.iter().find(|c| c.status == TaskStatus::Arquivada).unwrap();
        assert_eq!(archived.tasks.len(), 1);
    }

    #[test]
    fn cancelled_tasks_are_not_on_the_board() {
        let board = build_board(vec![card(task(TaskStatus::Cancelada, Utc::now()))], true);
        assert!(board.columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[test]
    fn status_labels_match_the_wire_format() {
        let json = serde_json::to_string(&TaskStatus::EmAndamento).unwrap();
        assert_eq!(json, format!("\"{}\"", TaskStatus::EmAndamento.label()));
    }
}
