//! Rotas públicas: health, documentação, arquivos e validação do login.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, json_request, send};
use serde_json::json;

#[tokio::test]
async fn health_returns_ok() {
    let response = get(build_test_app(&[]), "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(build_test_app(&[]), "/api/nao-existe").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_lists_routes_and_bearer_scheme() {
    let response = get(build_test_app(&[]), "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/racks"].is_object());
    assert!(doc["paths"]["/api/tasks/board"].is_object());
    assert!(doc["paths"]["/api/terms/pdf"].is_object());
    assert_eq!(doc["components"]["securitySchemes"]["api_jwt"]["scheme"], "bearer");
}

#[tokio::test]
async fn storage_serves_files_from_configured_dir() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");
    let app = build_test_app(&[("STORAGE_DIR", dir)]);

    let response = get(app, "/storage/manifest.json").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_invalid_email_is_rejected_before_touching_the_database() {
    let request = json_request("POST", "/api/auth/login", &json!({ "email": "nao-e-email", "password": "123456" }));
    let response = send(build_test_app(&[]), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Um ou mais campos são inválidos.");
    assert!(body["details"]["email"].is_array());
}

#[tokio::test]
async fn validation_message_follows_accept_language() {
    let mut request = json_request("POST", "/api/auth/forgot-password", &json!({ "email": "x" }));
    request.headers_mut().insert("accept-language", "en-US,en;q=0.9".parse().unwrap());

    let response = send(build_test_app(&[]), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "One or more fields are invalid.");
}
