// src/models/password.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Credencial compartilhada da equipe (acesso só de coordenadores)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    pub id: Uuid,
    #[schema(example = "Console do firewall")]
    pub title: String,
    pub username: Option<String>,
    pub secret: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordFields {
    #[validate(custom(function = "crate::common::validation::not_blank", message = "O título é obrigatório."))]
    pub title: String,
    pub username: Option<String>,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub secret: String,
    #[validate(url(message = "URL inválida."))]
    pub url: Option<String>,
    pub notes: Option<String>,
}
