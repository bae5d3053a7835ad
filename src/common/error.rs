use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erros dos campos dinâmicos da categoria: chave do campo -> código do erro
    #[error("Metadados inválidos")]
    MetadataValidationError(HashMap<String, String>),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso restrito a coordenadores")]
    CoordinatorRequired,

    #[error("Usuário não é o dono do registro")]
    NotOwner,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Rack já existe: {0}")]
    RackNameAlreadyExists(String),

    #[error("Categoria já existe: {0}")]
    CategoryNameAlreadyExists(String),

    #[error("Categoria em uso: {0}")]
    CategoryInUse(String),

    #[error("Número de série já existe: {0}")]
    SerialAlreadyExists(String),

    #[error("Confirmação obrigatória")]
    ConfirmationRequired,

    #[error("Seleção vazia")]
    EmptySelection,

    #[error("Limite de níveis do rack: {0}")]
    TooManyLevels(i32),

    #[error("Limite de posições por nível: {0}")]
    TooManyPositions(i32),

    #[error("Transição inválida: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Férias terminando em mês bloqueado: {0}")]
    VacationInBlockedMonth(chrono::NaiveDate),

    #[error("Intervalo de datas inválido")]
    InvalidDateRange,

    #[error("Modelo de termo não encontrado: {0}")]
    TemplateNotFound(String),

    #[error("Token de recuperação inválido")]
    InvalidResetToken,

    #[error("Tipo de mídia não suportado: {0}")]
    UnsupportedMediaType(String),

    #[error("Arquivo muito grande")]
    PayloadTooLarge,

    #[error("Não é possível excluir o próprio usuário")]
    CannotDeleteSelf,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// A resposta de erro que realmente vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP, chave da mensagem no catálogo e parâmetros da mensagem.
    fn classify(&self) -> (StatusCode, &'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation", vec![]),
            AppError::MetadataValidationError(_) => (StatusCode::BAD_REQUEST, "metadata_invalid", vec![]),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_exists", vec![]),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials", vec![]),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", vec![]),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", vec![]),
            AppError::CoordinatorRequired => (StatusCode::FORBIDDEN, "coordinator_required", vec![]),
            AppError::NotOwner => (StatusCode::FORBIDDEN, "not_owner", vec![]),
            AppError::ResourceNotFound(resource) => {
                (StatusCode::NOT_FOUND, "not_found", vec![("resource", resource.clone())])
            }
            AppError::RackNameAlreadyExists(name) => {
                (StatusCode::CONFLICT, "rack_name_exists", vec![("name", name.clone())])
            }
            AppError::CategoryNameAlreadyExists(name) => {
                (StatusCode::CONFLICT, "category_name_exists", vec![("name", name.clone())])
            }
            AppError::CategoryInUse(name) => {
                (StatusCode::CONFLICT, "category_in_use", vec![("name", name.clone())])
            }
            AppError::SerialAlreadyExists(serial) => {
                (StatusCode::CONFLICT, "serial_exists", vec![("serial", serial.clone())])
            }
            AppError::ConfirmationRequired => (StatusCode::BAD_REQUEST, "confirmation_required", vec![]),
            AppError::EmptySelection => (StatusCode::BAD_REQUEST, "empty_selection", vec![]),
            AppError::TooManyLevels(max) => (StatusCode::BAD_REQUEST, "too_many_levels", vec![("max", max.to_string())]),
            AppError::TooManyPositions(max) => {
                (StatusCode::BAD_REQUEST, "too_many_positions", vec![("max", max.to_string())])
            }
            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                "invalid_transition",
                vec![("from", from.clone()), ("to", to.clone())],
            ),
            AppError::VacationInBlockedMonth(end) => (
                StatusCode::BAD_REQUEST,
                "vacation_blocked_month",
                vec![("end", end.format("%d/%m/%Y").to_string())],
            ),
            AppError::InvalidDateRange => (StatusCode::BAD_REQUEST, "invalid_date_range", vec![]),
            AppError::TemplateNotFound(template) => {
                (StatusCode::NOT_FOUND, "template_not_found", vec![("template", template.clone())])
            }
            AppError::InvalidResetToken => (StatusCode::BAD_REQUEST, "invalid_reset_token", vec![]),
            AppError::UnsupportedMediaType(media) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                vec![("media", media.clone())],
            ),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", vec![]),
            AppError::CannotDeleteSelf => (StatusCode::BAD_REQUEST, "cannot_delete_self", vec![]),
            AppError::FontNotFound(_) => (StatusCode::INTERNAL_SERVER_ERROR, "font_not_found", vec![]),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", vec![]),
        }
    }

    /// Converte o erro de domínio na resposta localizada.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key, params) = self.classify();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                collect_validation_messages("", &errors, &mut details);
                Some(json!(details))
            }
            AppError::MetadataValidationError(errors) => Some(json!(errors)),
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, key, &params),
            details,
        }
    }
}

// Usado pelos middlewares, onde ainda não sabemos o idioma da requisição.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::fallback())
            .into_response()
    }
}

/// Achata os erros do `validator`, incluindo structs e listas aninhadas (`items[0].quantity`).
fn collect_validation_messages(prefix: &str, errors: &ValidationErrors, out: &mut HashMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

/// Converte violação de unicidade em erro de domínio; o resto vira `DatabaseError`.
pub(crate) fn on_unique_violation(e: sqlx::Error, conflict: impl FnOnce() -> AppError) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return conflict();
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Locale {
        Locale("pt".into())
    }

    #[test]
    fn domain_conflicts_map_to_409() {
        let api = AppError::RackNameAlreadyExists("R1".into()).to_api_error(&pt(), I18nStore::fallback());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.error.contains("R1"));
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo do banco"))
            .to_api_error(&pt(), I18nStore::fallback());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
    }

    #[test]
    fn metadata_errors_are_returned_as_details() {
        let mut errors = HashMap::new();
        errors.insert("ram_gb".to_string(), "invalid_number".to_string());
        let api = AppError::MetadataValidationError(errors).to_api_error(&pt(), I18nStore::fallback());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["ram_gb"], "invalid_number");
    }

    #[test]
    fn nested_item_errors_are_reported_with_their_path() {
        use crate::{handlers::racks::UpdateAddressPayload, models::rack::AddressItem};
        use validator::Validate;

        let payload = UpdateAddressPayload {
            items: vec![
                AddressItem { id: None, name: "Mouse".into(), quantity: 2 },
                AddressItem { id: None, name: "".into(), quantity: -3 },
            ],
            observation: None,
        };
        let errors = payload.validate().unwrap_err();

        let api = AppError::ValidationError(errors).to_api_error(&pt(), I18nStore::fallback());
        let details = api.details.unwrap();

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(details["items[1].name"][0], "O nome do item é obrigatório.");
        assert_eq!(details["items[1].quantity"][0], "A quantidade não pode ser negativa.");
        assert!(details.get("items[0].name").is_none());
    }

    #[test]
    fn transition_message_names_both_states() {
        let api = AppError::InvalidTransition { from: "Descartado".into(), to: "Em uso".into() }
            .to_api_error(&Locale("en".into()), I18nStore::fallback());
        assert_eq!(api.error, "Cannot change status from 'Descartado' to 'Em uso'.");
    }
}
