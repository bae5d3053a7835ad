// src/handlers/tasks.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        task::{AutoArchiveReport, Task, TaskBoard, TaskCard, TaskComment, TaskFields, TaskStatus},
        views::{RecordViewPayload, ViewRecord},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct BoardQuery {
    #[serde(default)]
    pub show_archived: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeTaskStatusPayload {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentPayload {
    #[validate(
        length(max = 2000, message = "O comentário deve ter até 2000 caracteres."),
        custom(function = "crate::common::validation::not_blank", message = "O comentário não pode ficar vazio.")
    )]
    pub body: String,
}

#[utoipa::path(
    get,
    path = "/api/tasks/board",
    tag = "Tasks",
    params(BoardQuery),
    responses((status = 200, description = "Quadro Kanban por status", body = TaskBoard)),
    security(("api_jwt" = []))
)]
pub async fn get_board(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<BoardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let board = app_state
        .task_service
        .board(query.show_archived)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(board)))
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(TaskListQuery),
    responses((status = 200, description = "Pendências, opcionalmente filtradas por status", body = Vec<TaskCard>)),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<TaskListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = app_state
        .task_service
        .list(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tasks)))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = TaskFields,
    responses((status = 201, description = "Pendência criada como Aberta", body = Task)),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<TaskFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .create(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da pendência")),
    responses(
        (status = 200, description = "Pendência com comentários e visualizações", body = TaskCard),
        (status = 404, description = "Pendência não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_task(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let card = app_state
        .task_service
        .get(task_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(card)))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da pendência")),
    request_body = TaskFields,
    responses(
        (status = 200, description = "Pendência atualizada", body = Task),
        (status = 403, description = "Sem permissão para editar")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<TaskFields>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_service
        .update(&user, task_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(task)))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da pendência")),
    responses(
        (status = 204, description = "Pendência excluída"),
        (status = 403, description = "Só quem criou ou um coordenador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .task_service
        .delete(&user, task_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}/status",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da pendência")),
    request_body = ChangeTaskStatusPayload,
    responses((status = 200, description = "Cartão movido", body = Task)),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<ChangeTaskStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let task = app_state
        .task_service
        .change_status(&user, task_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(task)))
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/views",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da pendência")),
    request_body = RecordViewPayload,
    responses(
        (status = 200, description = "Lista \"visto por\" atualizada", body = Vec<ViewRecord>),
        (status = 400, description = "Cartão pouco visível")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_view(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
    payload: Option<Json<RecordViewPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();

    let views = app_state
        .task_service
        .record_view(&user, task_id, payload.visible_ratio)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(views)))
}

// Chamado pelo quadro ao carregar; o job de fundo faz o mesmo periodicamente
#[utoipa::path(
    post,
    path = "/api/tasks/auto-archive",
    tag = "Tasks",
    responses((status = 200, description = "Pendências arquivadas nesta execução", body = AutoArchiveReport)),
    security(("api_jwt" = []))
)]
pub async fn auto_archive(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .task_service
        .archive_due(Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// ---
// Comentários
// ---

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/comments",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da pendência")),
    responses((status = 200, description = "Comentários em ordem de criação", body = Vec<TaskComment>)),
    security(("api_jwt" = []))
)]
pub async fn list_comments(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = app_state
        .task_service
        .list_comments(task_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(comments)))
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/comments",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da pendência")),
    request_body = CommentPayload,
    responses((status = 201, description = "Comentário criado", body = TaskComment)),
    security(("api_jwt" = []))
)]
pub async fn add_comment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let comment = app_state
        .task_service
        .add_comment(&user, task_id, &payload.body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    put,
    path = "/api/tasks/comments/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID do comentário")),
    request_body = CommentPayload,
    responses(
        (status = 200, description = "Comentário editado", body = TaskComment),
        (status = 403, description = "Só o autor edita")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_comment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let comment = app_state
        .task_service
        .update_comment(&user, comment_id, &payload.body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/comments/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID do comentário")),
    responses(
        (status = 204, description = "Comentário excluído"),
        (status = 403, description = "Só o autor exclui")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_comment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .task_service
        .delete_comment(&user, comment_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
