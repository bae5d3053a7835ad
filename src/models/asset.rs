// src/models/asset.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "asset_status")]
pub enum AssetStatus {
    #[sqlx(rename = "Em estoque")]
    #[serde(rename = "Em estoque")]
    EmEstoque,
    #[sqlx(rename = "Em uso")]
    #[serde(rename = "Em uso")]
    EmUso,
    #[sqlx(rename = "Em manutenção")]
    #[serde(rename = "Em manutenção")]
    EmManutencao,
    Descartado,
}

impl AssetStatus {
    pub fn label(self) -> &'static str {
        match self {
            AssetStatus::EmEstoque => "Em estoque",
            AssetStatus::EmUso => "Em uso",
            AssetStatus::EmManutencao => "Em manutenção",
            AssetStatus::Descartado => "Descartado",
        }
    }

    /// Descartado é terminal; manutenção sempre volta para o estoque.
    pub fn can_transition_to(self, next: AssetStatus) -> bool {
        use AssetStatus::*;
        matches!(
            (self, next),
            (EmEstoque, EmUso)
                | (EmUso, EmEstoque)
                | (EmEstoque | EmUso, EmManutencao)
                | (EmManutencao, EmEstoque)
                | (EmEstoque | EmUso | EmManutencao, Descartado)
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "5CG1234XYZ")]
    pub serial_number: String,
    pub description: Option<String>,
    pub status: AssetStatus,
    pub holder_name: Option<String>,
    pub holder_registration: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub decommissioned_at: Option<DateTime<Utc>>,
    pub decommission_reason: Option<String>,
    pub decommissioned_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub description: String,
    pub opened_by: Option<Uuid>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetail {
    #[serde(flatten)]
    pub asset: Asset,
    pub maintenance: Vec<MaintenanceRecord>,
}

// Campos editáveis do ativo; o status só muda pelas rotas de fluxo
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetFields {
    pub category_id: Uuid,
    #[validate(custom(function = "crate::common::validation::not_blank", message = "O número de série é obrigatório."))]
    pub serial_number: String,
    pub description: Option<String>,
    pub holder_name: Option<String>,
    pub holder_registration: Option<String>,
    #[serde(default = "empty_metadata")]
    #[schema(value_type = Object)]
    pub metadata: Value,
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

/// Troca simples entre estoque e uso; ao entrar em uso informa o portador.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetStatusPayload {
    pub status: AssetStatus,
    pub holder_name: Option<String>,
    pub holder_registration: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenancePayload {
    #[validate(custom(function = "crate::common::validation::not_blank", message = "Descreva o problema."))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinishMaintenancePayload {
    pub resolution: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecommissionPayload {
    #[validate(custom(function = "crate::common::validation::not_blank", message = "Informe o motivo do descarte."))]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AssetFilter {
    pub status: Option<AssetStatus>,
    pub category_id: Option<Uuid>,
    // Busca parcial pelo número de série
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::AssetStatus::*;

    #[test]
    fn discarded_assets_cannot_come_back() {
        for next in [EmEstoque, EmUso, EmManutencao, Descartado] {
            assert!(!Descartado.can_transition_to(next));
        }
    }

    #[test]
    fn maintenance_returns_to_stock_only() {
        assert!(EmManutencao.can_transition_to(EmEstoque));
        assert!(!EmManutencao.can_transition_to(EmUso));
    }

    #[test]
    fn blank_serial_number_fails_validation() {
        use validator::Validate;

        let fields = super::AssetFields {
            category_id: uuid::Uuid::new_v4(),
            serial_number: "  \t ".into(),
            description: None,
            holder_name: None,
            holder_registration: None,
            metadata: super::empty_metadata(),
        };
        assert!(fields.validate().unwrap_err().field_errors().contains_key("serial_number"));
    }

    #[test]
    fn assets_in_use_can_go_to_maintenance_or_be_discarded() {
        assert!(EmUso.can_transition_to(EmManutencao));
        assert!(EmUso.can_transition_to(Descartado));
        assert!(!EmUso.can_transition_to(EmUso));
    }
}
