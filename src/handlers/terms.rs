// src/handlers/terms.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::term::{IssuedTerm, RenderTermPayload, RenderedTerm, TermTemplate},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct IssuedQuery {
    pub serial_number: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/terms/templates",
    tag = "Terms",
    responses((status = 200, description = "Modelos disponíveis", body = Vec<TermTemplate>)),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let templates = app_state
        .document_service
        .list_templates()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(templates)))
}

#[utoipa::path(
    get,
    path = "/api/terms",
    tag = "Terms",
    params(IssuedQuery),
    responses((status = 200, description = "Termos já emitidos", body = Vec<IssuedTerm>)),
    security(("api_jwt" = []))
)]
pub async fn list_issued(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<IssuedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let terms = app_state
        .document_service
        .list_issued(query.serial_number.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(terms)))
}

#[utoipa::path(
    post,
    path = "/api/terms/render",
    tag = "Terms",
    request_body = RenderTermPayload,
    responses(
        (status = 201, description = "Termo preenchido e registrado", body = RenderedTerm),
        (status = 404, description = "Modelo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn render_term(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<RenderTermPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let rendered = app_state
        .document_service
        .render(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(rendered)))
}

#[utoipa::path(
    post,
    path = "/api/terms/pdf",
    tag = "Terms",
    request_body = RenderTermPayload,
    responses(
        (status = 200, description = "Termo em PDF com QR code do serial", content_type = "application/pdf"),
        (status = 404, description = "Modelo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn term_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<RenderTermPayload>,
) -> Result<Response, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let pdf = app_state
        .document_service
        .pdf(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", pdf.file_name)),
    ];

    Ok((headers, pdf.bytes).into_response())
}
