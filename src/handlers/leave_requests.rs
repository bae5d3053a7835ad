// src/handlers/leave_requests.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        leave::{LeaveRequest, LeaveRequestEntry, LeaveRequestFields, LeaveTransitionPayload},
        views::{RecordViewPayload, ViewRecord},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

#[utoipa::path(
    get,
    path = "/api/leave-requests",
    tag = "Leave Requests",
    params(LeaveListQuery),
    responses((status = 200, description = "Próprias solicitações, ou todas para coordenadores", body = Vec<LeaveRequestEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<LeaveListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .leave_service
        .list(&user, query.include_archived)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

#[utoipa::path(
    post,
    path = "/api/leave-requests",
    tag = "Leave Requests",
    request_body = LeaveRequestFields,
    responses(
        (status = 201, description = "Solicitação criada como Pendente", body = LeaveRequest),
        (status = 400, description = "Período inválido ou férias terminando entre outubro e dezembro")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<LeaveRequestFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .leave_service
        .create(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/leave-requests/{id}",
    tag = "Leave Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação", body = LeaveRequestEntry),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .leave_service
        .get(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}",
    tag = "Leave Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = LeaveRequestFields,
    responses(
        (status = 200, description = "Solicitação atualizada", body = LeaveRequest),
        (status = 403, description = "Só pendentes, pelo dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeaveRequestFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .leave_service
        .update(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}

#[utoipa::path(
    delete,
    path = "/api/leave-requests/{id}",
    tag = "Leave Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses((status = 204, description = "Solicitação excluída")),
    security(("api_jwt" = []))
)]
pub async fn delete_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .leave_service
        .delete(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}/status",
    tag = "Leave Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = LeaveTransitionPayload,
    responses(
        (status = 200, description = "Status alterado", body = LeaveRequest),
        (status = 403, description = "Apenas coordenadores"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeaveTransitionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .leave_service
        .transition(&user, id, payload.status, payload.note.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}

#[utoipa::path(
    post,
    path = "/api/leave-requests/{id}/views",
    tag = "Leave Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
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
        .leave_service
        .record_view(&user, id, payload.visible_ratio)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(views)))
}
