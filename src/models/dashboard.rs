// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Contagem agrupada (status -> quantidade)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    #[schema(example = "Em uso")]
    pub status: String,
    pub total: i64,
}

// Os cards do topo da página inicial
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub assets_by_status: Vec<StatusCount>,
    pub open_tasks_by_status: Vec<StatusCount>,
    pub pending_leave_requests: i64,
    pub unseen_shift_changes: i64,
}
