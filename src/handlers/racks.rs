// src/handlers/racks.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::rack::{Address, AddressItem, ItemLocation, Rack, RackLayout, MAX_LEVELS, MAX_POSITIONS_PER_LEVEL},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRackPayload {
    #[validate(
        length(max = 100, message = "O nome do rack deve ter até 100 caracteres."),
        custom(function = "crate::common::validation::not_blank", message = "O nome do rack é obrigatório.")
    )]
    pub name: String,
    #[validate(range(min = 1, max = MAX_LEVELS, message = "O rack deve ter entre 1 e 50 níveis."))]
    pub levels: i32,
    #[validate(range(min = 1, max = MAX_POSITIONS_PER_LEVEL, message = "Cada nível deve ter entre 1 e 100 posições."))]
    pub positions_per_level: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddLevelsPayload {
    #[validate(range(min = 1, max = MAX_LEVELS, message = "Informe entre 1 e 50 níveis."))]
    pub count: i32,
}

// Aceita ["A", "B"] ou ["A, B, C"]
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddPositionsPayload {
    #[validate(range(min = 1, max = MAX_LEVELS, message = "Nível inválido."))]
    pub level: i32,
    #[validate(length(min = 1, message = "Informe ao menos uma posição."))]
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveLevelsPayload {
    pub levels: Vec<i32>,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemovePositionsPayload {
    pub level: i32,
    pub names: Vec<String>,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAddressPayload {
    #[validate(nested)]
    pub items: Vec<AddressItem>,
    pub observation: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemSearchQuery {
    /// Trecho do nome do item
    pub q: String,
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/racks",
    tag = "Racks",
    responses((status = 200, description = "Racks cadastrados", body = Vec<Rack>)),
    security(("api_jwt" = []))
)]
pub async fn list_racks(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let racks = app_state
        .rack_service
        .list_racks()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(racks)))
}

#[utoipa::path(
    post,
    path = "/api/racks",
    tag = "Racks",
    request_body = CreateRackPayload,
    responses(
        (status = 201, description = "Rack criado com todos os endereços", body = RackLayout),
        (status = 409, description = "Nome já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_rack(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateRackPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let layout = app_state
        .rack_service
        .create_rack(&payload.name, payload.levels, payload.positions_per_level)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(layout)))
}

#[utoipa::path(
    get,
    path = "/api/racks/{id}",
    tag = "Racks",
    params(("id" = Uuid, Path, description = "ID do rack")),
    responses(
        (status = 200, description = "Estrutura do rack por nível", body = RackLayout),
        (status = 404, description = "Rack não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_rack(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(rack_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let layout = app_state
        .rack_service
        .get_layout(rack_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(layout)))
}

#[utoipa::path(
    delete,
    path = "/api/racks/{id}",
    tag = "Racks",
    params(("id" = Uuid, Path, description = "ID do rack"), ConfirmQuery),
    responses(
        (status = 204, description = "Rack e endereços excluídos"),
        (status = 400, description = "Confirmação ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_rack(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(rack_id): Path<Uuid>,
    Query(query): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .rack_service
        .delete_rack(rack_id, query.confirm)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/racks/{id}/levels",
    tag = "Racks",
    params(("id" = Uuid, Path, description = "ID do rack")),
    request_body = AddLevelsPayload,
    responses((status = 200, description = "Níveis adicionados", body = RackLayout)),
    security(("api_jwt" = []))
)]
pub async fn add_levels(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(rack_id): Path<Uuid>,
    Json(payload): Json<AddLevelsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let layout = app_state
        .rack_service
        .add_levels(rack_id, payload.count)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(layout)))
}

#[utoipa::path(
    post,
    path = "/api/racks/{id}/levels/remove",
    tag = "Racks",
    params(("id" = Uuid, Path, description = "ID do rack")),
    request_body = RemoveLevelsPayload,
    responses(
        (status = 200, description = "Níveis removidos", body = Rack),
        (status = 400, description = "Confirmação ausente ou seleção vazia")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_levels(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(rack_id): Path<Uuid>,
    Json(payload): Json<RemoveLevelsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let rack = app_state
        .rack_service
        .remove_levels(rack_id, &payload.levels, payload.confirm)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rack)))
}

#[utoipa::path(
    post,
    path = "/api/racks/{id}/positions",
    tag = "Racks",
    params(("id" = Uuid, Path, description = "ID do rack")),
    request_body = AddPositionsPayload,
    responses((status = 201, description = "Posições criadas (as já existentes são ignoradas)", body = Vec<Address>)),
    security(("api_jwt" = []))
)]
pub async fn add_positions(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(rack_id): Path<Uuid>,
    Json(payload): Json<AddPositionsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let created = app_state
        .rack_service
        .add_positions(rack_id, payload.level, &payload.names)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/racks/{id}/positions/remove",
    tag = "Racks",
    params(("id" = Uuid, Path, description = "ID do rack")),
    request_body = RemovePositionsPayload,
    responses((status = 200, description = "Posições removidas", body = Rack)),
    security(("api_jwt" = []))
)]
pub async fn remove_positions(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(rack_id): Path<Uuid>,
    Json(payload): Json<RemovePositionsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let rack = app_state
        .rack_service
        .remove_positions(rack_id, payload.level, &payload.names, payload.confirm)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rack)))
}

#[utoipa::path(
    put,
    path = "/api/racks/addresses/{id}",
    tag = "Racks",
    params(("id" = Uuid, Path, description = "ID do endereço")),
    request_body = UpdateAddressPayload,
    responses(
        (status = 200, description = "Itens e observação atualizados", body = Address),
        (status = 404, description = "Endereço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_address(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(address_id): Path<Uuid>,
    Json(payload): Json<UpdateAddressPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let address = app_state
        .rack_service
        .update_address(address_id, payload.items, payload.observation.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(address)))
}

#[utoipa::path(
    get,
    path = "/api/racks/search",
    tag = "Racks",
    params(ItemSearchQuery),
    responses((status = 200, description = "Endereços que guardam o item", body = Vec<ItemLocation>)),
    security(("api_jwt" = []))
)]
pub async fn search_items(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<ItemSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let locations = app_state
        .rack_service
        .search_items(&query.q)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(locations)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rack_dimensions_are_bounded() {
        let ok = CreateRackPayload { name: "R1".into(), levels: 50, positions_per_level: 100 };
        assert!(ok.validate().is_ok());

        let too_tall = CreateRackPayload { name: "R1".into(), levels: 51, positions_per_level: 1 };
        assert!(too_tall.validate().is_err());

        let empty = CreateRackPayload { name: "R1".into(), levels: 1, positions_per_level: 0 };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn blank_rack_name_is_rejected() {
        let blank = CreateRackPayload { name: "   ".into(), levels: 2, positions_per_level: 3 };
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn add_positions_level_stays_within_rack_limit() {
        let beyond = AddPositionsPayload { level: MAX_LEVELS + 1, names: vec!["A".into()] };
        assert!(beyond.validate().is_err());
    }
}
