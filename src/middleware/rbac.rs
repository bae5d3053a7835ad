// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

/// Guardião das rotas de coordenador. Entrega o próprio usuário ao handler.
pub struct RequireCoordinator(pub User);

impl<S> FromRequestParts<S> for RequireCoordinator
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !user.is_coordinator() {
            tracing::warn!(user_id = %user.id, "Acesso negado: rota de coordenador.");
            return Err(AppError::CoordinatorRequired.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireCoordinator(user))
    }
}
