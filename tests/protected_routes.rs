//! O guard de autenticação barra as rotas protegidas antes de qualquer consulta.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{body_json, build_test_app, send};

fn request_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    for uri in [
        "/api/users/me",
        "/api/racks",
        "/api/tasks/board",
        "/api/shift-changes",
        "/api/leave-requests",
        "/api/assets",
        "/api/categories",
        "/api/passwords",
        "/api/terms/templates",
        "/api/dashboard/summary",
    ] {
        let response = send(build_test_app(&[]), request_with_auth(uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn malformed_or_forged_tokens_are_rejected() {
    for header in ["Basic dXNlcjpzZW5oYQ==", "Bearer", "Bearer nao.e.um.jwt"] {
        let response = send(build_test_app(&[]), request_with_auth("/api/racks", Some(header))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{header}");
    }
}

#[tokio::test]
async fn unauthorized_body_is_localized() {
    let mut request = request_with_auth("/api/assets", None);
    request.headers_mut().insert("accept-language", "en".parse().unwrap());

    let response = send(build_test_app(&[]), request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid or missing authentication token."
    );
}
