// src/models/shift_change.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::views::ViewRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "shift_change_status")]
pub enum ShiftChangeStatus {
    Aprovado,
    Arquivado,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftChange {
    pub id: Uuid,
    #[schema(example = "Troca de plantão: Ana cobre o turno da noite do Carlos")]
    pub description: String,
    pub shift_date: NaiveDate,
    #[schema(value_type = String, example = "22:00:00")]
    pub shift_time: NaiveTime,
    pub status: ShiftChangeStatus,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftChangeEntry {
    #[serde(flatten)]
    pub shift_change: ShiftChange,
    pub viewed_by: Vec<ViewRecord>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftChangeFields {
    #[validate(custom(function = "crate::common::validation::not_blank", message = "A descrição é obrigatória."))]
    pub description: String,
    pub shift_date: NaiveDate,
    #[schema(value_type = String, example = "22:00")]
    pub shift_time: NaiveTime,
}
