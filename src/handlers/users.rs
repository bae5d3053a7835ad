// src/handlers/users.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireCoordinator},
    models::auth::{CreateUserPayload, ResetLinkResponse, UpdateRolePayload, User},
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Todos os usuários", body = Vec<User>),
        (status = 403, description = "Apenas coordenadores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _coordinator: RequireCoordinator,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_service
        .list_users()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _coordinator: RequireCoordinator,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .create_user(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/users/{id}/role
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Users",
    request_body = UpdateRolePayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    locale: Locale,
    _coordinator: RequireCoordinator,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .user_service
        .update_role(user_id, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(user)))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário excluído"),
        (status = 400, description = "Não é possível excluir a si mesmo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireCoordinator(actor): RequireCoordinator,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_service
        .delete_user(&actor, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/users/{id}/reset-password
#[utoipa::path(
    post,
    path = "/api/users/{id}/reset-password",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 201, description = "Link de redefinição gerado", body = ResetLinkResponse),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_user_password(
    State(app_state): State<AppState>,
    locale: Locale,
    _coordinator: RequireCoordinator,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let link = app_state
        .user_service
        .reset_link_for(user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(link)))
}

// PUT /api/users/me/avatar
// Corpo cru da imagem; o tipo vem do Content-Type
#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    tag = "Users",
    request_body(content = Vec<u8>, content_type = "image/png"),
    responses(
        (status = 200, description = "Avatar atualizado", body = User),
        (status = 413, description = "Imagem maior que 2 MiB"),
        (status = 415, description = "Formato não suportado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_avatar(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let updated = app_state
        .user_service
        .upload_avatar(user.id, content_type, &body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}
