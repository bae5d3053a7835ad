// src/handlers/shift_changes.rs

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
    models::{
        shift_change::{ShiftChange, ShiftChangeEntry, ShiftChangeFields},
        views::{RecordViewPayload, ViewRecord},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ShiftListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ArchivePayload {
    pub archived: bool,
}

#[utoipa::path(
    get,
    path = "/api/shift-changes",
    tag = "Shift Changes",
    params(ShiftListQuery),
    responses((status = 200, description = "Trocas de turno com \"visto por\"", body = Vec<ShiftChangeEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_shift_changes(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<ShiftListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .shift_service
        .list(query.include_archived)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    post,
    path = "/api/shift-changes",
    tag = "Shift Changes",
    request_body = ShiftChangeFields,
    responses((status = 201, description = "Troca registrada", body = ShiftChange)),
    security(("api_jwt" = []))
)]
pub async fn create_shift_change(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ShiftChangeFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .shift_service
        .create(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/shift-changes/{id}",
    tag = "Shift Changes",
    params(("id" = Uuid, Path, description = "ID da troca de turno")),
    responses(
        (status = 200, description = "Troca de turno", body = ShiftChangeEntry),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_shift_change(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = app_state
        .shift_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/shift-changes/{id}",
    tag = "Shift Changes",
    params(("id" = Uuid, Path, description = "ID da troca de turno")),
    request_body = ShiftChangeFields,
    responses(
        (status = 200, description = "Troca atualizada", body = ShiftChange),
        (status = 403, description = "Só quem criou ou um coordenador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_shift_change(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShiftChangeFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .shift_service
        .update(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/shift-changes/{id}/archive",
    tag = "Shift Changes",
    params(("id" = Uuid, Path, description = "ID da troca de turno")),
    request_body = ArchivePayload,
    responses((status = 200, description = "Arquivada ou reaberta", body = ShiftChange)),
    security(("api_jwt" = []))
)]
pub async fn set_archived(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArchivePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = app_state
        .shift_service
        .set_archived(&user, id, payload.archived)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/shift-changes/{id}",
    tag = "Shift Changes",
    params(("id" = Uuid, Path, description = "ID da troca de turno")),
    responses((status = 204, description = "Troca excluída")),
    security(("api_jwt" = []))
)]
pub async fn delete_shift_change(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .shift_service
        .delete(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/shift-changes/{id}/views",
    tag = "Shift Changes",
    params(("id" = Uuid, Path, description = "ID da troca de turno")),
    request_body = RecordViewPayload,
    responses((status = 200, description = "Lista \"visto por\" atualizada", body = Vec<ViewRecord>)),
    security(("api_jwt" = []))
)]
pub async fn record_view(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<RecordViewPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();

    let views = app_state
        .shift_service
        .record_view(&user, id, payload.visible_ratio)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(views)))
}
