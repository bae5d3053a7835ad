// src/handlers/assets.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::asset::{
        Asset, AssetDetail, AssetFields, AssetFilter, AssetStatusPayload, DecommissionPayload,
        FinishMaintenancePayload, MaintenancePayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "Assets",
    params(AssetFilter),
    responses((status = 200, description = "Ativos filtrados", body = Vec<Asset>)),
    security(("api_jwt" = []))
)]
pub async fn list_assets(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<AssetFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let assets = app_state
        .asset_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(assets)))
}

#[utoipa::path(
    post,
    path = "/api/assets",
    tag = "Assets",
    request_body = AssetFields,
    responses(
        (status = 201, description = "Ativo cadastrado em estoque", body = Asset),
        (status = 400, description = "Metadados fora do molde da categoria"),
        (status = 409, description = "Número de série já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<AssetFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let asset = app_state
        .asset_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(asset)))
}

#[utoipa::path(
    get,
    path = "/api/assets/{id}",
    tag = "Assets",
    params(("id" = Uuid, Path, description = "ID do ativo")),
    responses(
        (status = 200, description = "Ativo com histórico de manutenção", body = AssetDetail),
        (status = 404, description = "Ativo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .asset_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/assets/serial/{serial}",
    tag = "Assets",
    params(("serial" = String, Path, description = "Número de série")),
    responses(
        (status = 200, description = "Ativo", body = Asset),
        (status = 404, description = "Ativo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_by_serial(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(serial): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let asset = app_state
        .asset_service
        .find_by_serial(&serial)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(asset)))
}

#[utoipa::path(
    put,
    path = "/api/assets/{id}",
    tag = "Assets",
    params(("id" = Uuid, Path, description = "ID do ativo")),
    request_body = AssetFields,
    responses((status = 200, description = "Ativo atualizado", body = Asset)),
    security(("api_jwt" = []))
)]
pub async fn update_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssetFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let asset = app_state
        .asset_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(asset)))
}

#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    tag = "Assets",
    params(("id" = Uuid, Path, description = "ID do ativo")),
    responses((status = 204, description = "Ativo excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .asset_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/assets/{id}/status",
    tag = "Assets",
    params(("id" = Uuid, Path, description = "ID do ativo")),
    request_body = AssetStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Asset),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssetStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let asset = app_state
        .asset_service
        .change_status(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(asset)))
}

#[utoipa::path(
    post,
    path = "/api/assets/{id}/maintenance",
    tag = "Assets",
    params(("id" = Uuid, Path, description = "ID do ativo")),
    request_body = MaintenancePayload,
    responses(
        (status = 200, description = "Ativo em manutenção com registro aberto", body = AssetDetail),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_to_maintenance(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaintenancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .asset_service
        .send_to_maintenance(&user, id, &payload.description)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/assets/{id}/maintenance/finish",
    tag = "Assets",
    params(("id" = Uuid, Path, description = "ID do ativo")),
    request_body = FinishMaintenancePayload,
    responses((status = 200, description = "Manutenção encerrada, ativo em estoque", body = AssetDetail)),
    security(("api_jwt" = []))
)]
pub async fn finish_maintenance(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FinishMaintenancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .asset_service
        .finish_maintenance(id, payload.resolution.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/assets/{id}/decommission",
    tag = "Assets",
    params(("id" = Uuid, Path, description = "ID do ativo")),
    request_body = DecommissionPayload,
    responses((status = 200, description = "Ativo descartado", body = Asset)),
    security(("api_jwt" = []))
)]
pub async fn decommission(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecommissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let asset = app_state
        .asset_service
        .decommission(&user, id, &payload.reason)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(asset)))
}
