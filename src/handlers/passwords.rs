// src/handlers/passwords.rs
// Cofre de senhas: todas as rotas exigem coordenador

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, rbac::RequireCoordinator},
    models::password::{PasswordEntry, PasswordFields},
};

#[utoipa::path(
    get,
    path = "/api/passwords",
    tag = "Passwords",
    responses(
        (status = 200, description = "Credenciais do cofre", body = Vec<PasswordEntry>),
        (status = 403, description = "Apenas coordenadores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_passwords(
    State(app_state): State<AppState>,
    locale: Locale,
    _coordinator: RequireCoordinator,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .password_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    post,
    path = "/api/passwords",
    tag = "Passwords",
    request_body = PasswordFields,
    responses((status = 201, description = "Credencial criada", body = PasswordEntry)),
    security(("api_jwt" = []))
)]
pub async fn create_password(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireCoordinator(user): RequireCoordinator,
    Json(payload): Json<PasswordFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .password_service
        .create(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/passwords/{id}",
    tag = "Passwords",
    params(("id" = Uuid, Path, description = "ID da credencial")),
    request_body = PasswordFields,
    responses((status = 200, description = "Credencial atualizada", body = PasswordEntry)),
    security(("api_jwt" = []))
)]
pub async fn update_password(
    State(app_state): State<AppState>,
    locale: Locale,
    _coordinator: RequireCoordinator,
    Path(id): Path<Uuid>,
    Json(payload): Json<PasswordFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .password_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/passwords/{id}",
    tag = "Passwords",
    params(("id" = Uuid, Path, description = "ID da credencial")),
    responses((status = 204, description = "Credencial excluída")),
    security(("api_jwt" = []))
)]
pub async fn delete_password(
    State(app_state): State<AppState>,
    locale: Locale,
    _coordinator: RequireCoordinator,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .password_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
