//! Rotas de coordenador recusam usuários comuns com 403, sem consultar o banco.

mod common;

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    routing::get,
    Router,
};
use chrono::Utc;
use common::{body_json, send, test_state};
use uuid::Uuid;

use gestao_ti::{
    handlers,
    models::auth::{User, UserRole},
};

fn user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        email: "tecnico@empresa.com.br".into(),
        full_name: "Técnico".into(),
        registration: Some("12345".into()),
        role,
        avatar_url: None,
        password_hash: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// Faz o papel do auth_guard, pendurando um usuário fixo na requisição
fn vault_router_as(logged: User) -> Router {
    Router::new()
        .route("/api/passwords", get(handlers::passwords::list_passwords))
        .layer(middleware::from_fn(move |mut request: Request, next: Next| {
            let logged = logged.clone();
            async move {
                request.extensions_mut().insert(logged);
                next.run(request).await
            }
        }))
        .with_state(test_state(&[]))
}

#[tokio::test]
async fn regular_user_gets_403_on_password_vault() {
    let app = vault_router_as(user(UserRole::Usuario));
    let request = Request::get("/api/passwords").body(Body::empty()).unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn request_without_user_is_treated_as_unauthenticated() {
    let app = Router::new()
        .route("/api/passwords", get(handlers::passwords::list_passwords))
        .with_state(test_state(&[]));
    let request = Request::get("/api/passwords").body(Body::empty()).unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
