// src/main.rs

use std::time::Duration;

use anyhow::Context;
use axum::http::{
    header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use gestao_ti::{background::auto_archive, build_router, config::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some((email, password)) = &app_state.config.bootstrap_admin {
        match app_state.auth_service.bootstrap_coordinator(email, password).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::debug!("Já existem usuários; coordenador inicial ignorado."),
            Err(e) => tracing::error!(error = %e, "Falha ao criar o coordenador inicial."),
        }
    }

    let cancel = CancellationToken::new();
    let archive_job = tokio::spawn(auto_archive::run(
        app_state.task_service.clone(),
        app_state.config.auto_archive_interval,
        cancel.clone(),
    ));

    let cors = build_cors_layer(&app_state.config.cors_origins)?;
    let bind_addr = app_state.config.bind_addr.clone();

    let app = build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao abrir o listener TCP em {}", bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erro no servidor Axum")?;

    cancel.cancel();
    if tokio::time::timeout(Duration::from_secs(5), archive_job).await.is_err() {
        tracing::warn!("Job de arquivamento não encerrou a tempo.");
    }

    tracing::info!("Servidor encerrado.");
    Ok(())
}

/// Sem origens configuradas, libera qualquer origem (ambiente de desenvolvimento).
fn build_cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed = origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("Origem CORS inválida: {}", o)))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT_LANGUAGE])
        .max_age(Duration::from_secs(3600)))
}

// Ctrl-C e SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Falha ao instalar o handler de Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Falha ao instalar o handler de SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Sinal de desligamento recebido.");
}
