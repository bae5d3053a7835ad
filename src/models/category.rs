// src/models/category.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// Mapeia o CREATE TYPE field_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "field_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Select,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Notebook")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- DEFINIÇÕES (O Molde) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "ram_gb")]
    pub key_name: String,
    #[schema(example = "Memória RAM (GB)")]
    pub label: String,
    pub field_type: FieldType,
    // Opções para Selects (Ex: ["Dell", "Lenovo"])
    #[schema(value_type = Option<Object>)]
    pub options: Option<Value>,
    pub is_required: bool,
    pub position: i32,
}

// Campo como chega do formulário de configuração
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinitionInput {
    #[validate(custom(function = "crate::common::validation::not_blank", message = "A chave do campo é obrigatória."))]
    pub key_name: String,
    #[validate(custom(function = "crate::common::validation::not_blank", message = "O rótulo do campo é obrigatório."))]
    pub label: String,
    pub field_type: FieldType,
    #[schema(value_type = Option<Vec<String>>)]
    pub options: Option<Value>,
    #[serde(default)]
    pub is_required: bool,
}

/// Criação e edição: a lista de campos substitui a anterior, na ordem enviada.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(
        length(max = 100, message = "O nome da categoria deve ter até 100 caracteres."),
        custom(function = "crate::common::validation::not_blank", message = "O nome da categoria é obrigatório.")
    )]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub fields: Vec<FieldDefinitionInput>,
}

/// Regras do molde que o `validator` não cobre: chaves únicas e opções em lista de textos.
pub fn check_field_definitions(fields: &[FieldDefinitionInput]) -> Result<(), AppError> {
    let mut errors: HashMap<String, String> = HashMap::new();
    let mut seen = std::collections::HashSet::new();

    for field in fields {
        let key = field.key_name.trim();
        if !seen.insert(key) {
            errors.insert(key.to_string(), "duplicate_key".to_string());
            continue;
        }
        if let Some(options) = &field.options {
            let valid = options
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !valid {
                errors.insert(key.to_string(), "invalid_options".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::MetadataValidationError(errors))
    }
}

/// Categoria com os campos na ordem em que o formulário deve exibi-los.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySchema {
    #[serde(flatten)]
    pub category: Category,
    pub fields: Vec<FieldDefinition>,
}

impl CategorySchema {
    /// Valida o `metadata` de um ativo contra os campos da categoria.
    /// Os erros saem como código por chave do campo.
    pub fn validate_metadata(&self, data: &Value) -> Result<(), AppError> {
        let obj = data.as_object().ok_or_else(|| {
            let mut errors = HashMap::new();
            errors.insert("metadata".to_string(), "invalid_object".to_string());
            AppError::MetadataValidationError(errors)
        })?;

        let mut errors: HashMap<String, String> = HashMap::new();

        for def in &self.fields {
            let value = obj.get(&def.key_name).filter(|v| !v.is_null());

            let Some(val) = value else {
                if def.is_required {
                    errors.insert(def.key_name.clone(), "required".to_string());
                }
                continue;
            };

            let valid = match def.field_type {
                FieldType::Number => val.is_number(),
                FieldType::Boolean => val.is_boolean(),
                FieldType::Text => val.is_string(),
                FieldType::Date => val
                    .as_str()
                    .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
                FieldType::Select => val.as_str().is_some_and(|s| def.allows_option(s)),
            };

            if !valid {
                let error_code = match def.field_type {
                    FieldType::Number => "invalid_number",
                    FieldType::Date => "invalid_date_format", // Espera YYYY-MM-DD
                    FieldType::Boolean => "invalid_boolean",
                    FieldType::Select => "invalid_option",
                    FieldType::Text => "invalid_text",
                };
                errors.insert(def.key_name.clone(), error_code.to_string());
            }
        }

        if !errors.is_empty() {
            return Err(AppError::MetadataValidationError(errors));
        }

        Ok(())
    }
}

impl FieldDefinition {
    fn allows_option(&self, candidate: &str) -> bool {
        match self.options.as_ref().and_then(Value::as_array) {
            Some(options) => options.iter().any(|o| o.as_str() == Some(candidate)),
            // Select sem opções configuradas aceita qualquer texto
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(key: &str, field_type: FieldType, required: bool, options: Option<Value>) -> FieldDefinition {
        FieldDefinition {
            id: Uuid::new_v4(),
            category_id: Uuid::nil(),
            key_name: key.to_string(),
            label: key.to_string(),
            field_type,
            options,
            is_required: required,
            position: 0,
        }
    }

    fn notebook_schema() -> CategorySchema {
        CategorySchema {
            category: Category {
                id: Uuid::nil(),
                name: "Notebook".into(),
                description: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            fields: vec![
                field("ram_gb", FieldType::Number, true, None),
                field("marca", FieldType::Select, true, Some(json!(["Dell", "Lenovo"]))),
                field("garantia_ate", FieldType::Date, false, None),
                field("possui_carregador", FieldType::Boolean, false, None),
            ],
        }
    }

    #[test]
    fn blank_category_name_is_rejected() {
        let payload = CategoryPayload { name: "   ".into(), description: None, fields: vec![] };
        assert!(validator::Validate::validate(&payload).unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn valid_metadata_passes() {
        let data = json!({ "ram_gb": 16, "marca": "Dell", "garantia_ate": "2027-03-01", "possui_carregador": true });
        assert!(notebook_schema().validate_metadata(&data).is_ok());
    }

    #[test]
    fn missing_required_and_wrong_types_are_reported_per_field() {
        let data = json!({ "marca": "Apple", "garantia_ate": "01/03/2027", "possui_carregador": "sim" });
        let Err(AppError::MetadataValidationError(errors)) = notebook_schema().validate_metadata(&data) else {
            panic!("esperava erro de metadados");
        };
        assert_eq!(errors["ram_gb"], "required");
        assert_eq!(errors["marca"], "invalid_option");
        assert_eq!(errors["garantia_ate"], "invalid_date_format");
        assert_eq!(errors["possui_carregador"], "invalid_boolean");
    }

    #[test]
    fn null_optional_fields_are_ignored() {
        let data = json!({ "ram_gb": 8, "marca": "Lenovo", "garantia_ate": null });
        assert!(notebook_schema().validate_metadata(&data).is_ok());
    }

    #[test]
    fn non_object_metadata_is_rejected() {
        assert!(notebook_schema().validate_metadata(&json!([1, 2])).is_err());
    }

    fn input(key: &str, options: Option<Value>) -> FieldDefinitionInput {
        FieldDefinitionInput {
            key_name: key.to_string(),
            label: key.to_string(),
            field_type: FieldType::Select,
            options,
            is_required: false,
        }
    }

    #[test]
    fn duplicate_keys_and_bad_options_are_rejected() {
        let fields = vec![
            input("marca", Some(json!(["Dell"]))),
            input("marca", None),
            input("cor", Some(json!({ "a": 1 }))),
        ];
        let Err(AppError::MetadataValidationError(errors)) = check_field_definitions(&fields) else {
            panic!("esperava erro no molde");
        };
        assert_eq!(errors["marca"], "duplicate_key");
        assert_eq!(errors["cor"], "invalid_options");
    }
}
