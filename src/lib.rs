// src/lib.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod background;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;
use crate::services::user_service::MAX_AVATAR_BYTES;

/// Monta o router completo. CORS e trace ficam no `main`.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password));

    let user_routes = Router::new()
        .route("/"
               ,get(handlers::users::list_users)
               .post(handlers::users::create_user)
        )
        .route("/me", get(handlers::auth::get_me))
        .route("/me/password", put(handlers::auth::change_password))
        .route("/me/avatar"
               ,put(handlers::users::upload_avatar)
               // Folga para o serviço responder com a mensagem localizada
               .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024))
        )
        .route("/{id}", delete(handlers::users::delete_user))
        .route("/{id}/role", put(handlers::users::update_role))
        .route("/{id}/reset-password", post(handlers::users::reset_user_password));

    let rack_routes = Router::new()
        .route("/"
               ,get(handlers::racks::list_racks)
               .post(handlers::racks::create_rack)
        )
        .route("/search", get(handlers::racks::search_items))
        .route("/addresses/{id}", put(handlers::racks::update_address))
        .route("/{id}"
               ,get(handlers::racks::get_rack)
               .delete(handlers::racks::delete_rack)
        )
        .route("/{id}/levels", post(handlers::racks::add_levels))
        .route("/{id}/levels/remove", post(handlers::racks::remove_levels))
        .route("/{id}/positions", post(handlers::racks::add_positions))
        .route("/{id}/positions/remove", post(handlers::racks::remove_positions));

    let task_routes = Router::new()
        .route("/"
               ,get(handlers::tasks::list_tasks)
               .post(handlers::tasks::create_task)
        )
        .route("/board", get(handlers::tasks::get_board))
        .route("/auto-archive", post(handlers::tasks::auto_archive))
        .route("/comments/{id}"
               ,put(handlers::tasks::update_comment)
               .delete(handlers::tasks::delete_comment)
        )
        .route("/{id}"
               ,get(handlers::tasks::get_task)
               .put(handlers::tasks::update_task)
               .delete(handlers::tasks::delete_task)
        )
        .route("/{id}/status", put(handlers::tasks::change_status))
        .route("/{id}/views", post(handlers::tasks::record_view))
        .route("/{id}/comments"
               ,get(handlers::tasks::list_comments)
               .post(handlers::tasks::add_comment)
        );

    let shift_routes = Router::new()
        .route("/"
               ,get(handlers::shift_changes::list_shift_changes)
               .post(handlers::shift_changes::create_shift_change)
        )
        .route("/{id}"
               ,get(handlers::shift_changes::get_shift_change)
               .put(handlers::shift_changes::update_shift_change)
               .delete(handlers::shift_changes::delete_shift_change)
        )
        .route("/{id}/archive", put(handlers::shift_changes::set_archived))
        .route("/{id}/views", post(handlers::shift_changes::record_view));

    let leave_routes = Router::new()
        .route("/"
               ,get(handlers::leave_requests::list_requests)
               .post(handlers::leave_requests::create_request)
        )
        .route("/{id}"
               ,get(handlers::leave_requests::get_request)
               .put(handlers::leave_requests::update_request)
               .delete(handlers::leave_requests::delete_request)
        )
        .route("/{id}/status", put(handlers::leave_requests::transition_request))
        .route("/{id}/views", post(handlers::leave_requests::record_view));

    let asset_routes = Router::new()
        .route("/"
               ,get(handlers::assets::list_assets)
               .post(handlers::assets::create_asset)
        )
        .route("/serial/{serial}", get(handlers::assets::get_by_serial))
        .route("/{id}"
               ,get(handlers::assets::get_asset)
               .put(handlers::assets::update_asset)
               .delete(handlers::assets::delete_asset)
        )
        .route("/{id}/status", put(handlers::assets::change_status))
        .route("/{id}/maintenance", post(handlers::assets::send_to_maintenance))
        .route("/{id}/maintenance/finish", post(handlers::assets::finish_maintenance))
        .route("/{id}/decommission", post(handlers::assets::decommission));

    let category_routes = Router::new()
        .route("/"
               ,get(handlers::categories::list_categories)
               .post(handlers::categories::create_category)
        )
        .route("/{id}"
               ,get(handlers::categories::get_category)
               .put(handlers::categories::update_category)
               .delete(handlers::categories::delete_category)
        );

    let password_routes = Router::new()
        .route("/"
               ,get(handlers::passwords::list_passwords)
               .post(handlers::passwords::create_password)
        )
        .route("/{id}"
               ,put(handlers::passwords::update_password)
               .delete(handlers::passwords::delete_password)
        );

    let term_routes = Router::new()
        .route("/", get(handlers::terms::list_issued))
        .route("/templates", get(handlers::terms::list_templates))
        .route("/render", post(handlers::terms::render_term))
        .route("/pdf", post(handlers::terms::term_pdf));

    // Tudo abaixo exige token válido
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/racks", rack_routes)
        .nest("/api/tasks", task_routes)
        .nest("/api/shift-changes", shift_routes)
        .nest("/api/leave-requests", leave_routes)
        .nest("/api/assets", asset_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/passwords", password_routes)
        .nest("/api/terms", term_routes)
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let storage = ServeDir::new(&app_state.config.storage_dir);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::dashboard::health))
        .nest("/api/auth", auth_routes)
        .nest_service("/storage", storage)
        .merge(protected)
        .with_state(app_state)
}
