// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AssetRepository, CategoryRepository, DashboardRepository, LeaveRepository, PasswordRepository,
        RackRepository, ShiftChangeRepository, TaskRepository, TermRepository, UserRepository, ViewRepository,
    },
    services::{
        asset_service::AssetService, auth::AuthService, category_service::CategoryService,
        dashboard_service::DashboardService, document_service::DocumentService, leave_service::LeaveService,
        password_service::PasswordService, rack_service::RackService, shift_service::ShiftChangeService,
        task_service::TaskService, user_service::UserService,
    },
};

/// Configuração lida do ambiente (e do `.env`, quando existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    // Base dos links de recuperação de senha (o frontend)
    pub site_url: String,
    // Base das URLs públicas dos arquivos em /storage
    pub public_base_url: String,
    pub storage_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub auto_archive_interval: Duration,
    pub cors_origins: Vec<String>,
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (facilita os testes).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = get("BIND_ADDR", "0.0.0.0:3000");
        let db_max_connections = get("DB_MAX_CONNECTIONS", "5")
            .parse()
            .context("DB_MAX_CONNECTIONS deve ser um número")?;
        let auto_archive_secs: u64 = get("AUTO_ARCHIVE_INTERVAL_SECS", "300")
            .parse()
            .context("AUTO_ARCHIVE_INTERVAL_SECS deve ser um número")?;

        let public_base_url = get("PUBLIC_BASE_URL", &format!("http://{}", bind_addr));
        let site_url = get("SITE_URL", "http://localhost:5173");

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let bootstrap_admin = match (lookup("BOOTSTRAP_ADMIN_EMAIL"), lookup("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            site_url: site_url.trim_end_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            storage_dir: PathBuf::from(get("STORAGE_DIR", "./storage")),
            templates_dir: PathBuf::from(get("TEMPLATES_DIR", "./templates")),
            fonts_dir: PathBuf::from(get("FONTS_DIR", "./fonts")),
            auto_archive_interval: Duration::from_secs(auto_archive_secs.max(1)),
            cors_origins,
            bootstrap_admin,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub rack_service: RackService,
    pub task_service: TaskService,
    pub shift_service: ShiftChangeService,
    pub leave_service: LeaveService,
    pub category_service: CategoryService,
    pub asset_service: AssetService,
    pub password_service: PasswordService,
    pub document_service: DocumentService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_parts(config, db_pool)
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn from_parts(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::from_embedded()?);

        let user_repo = UserRepository::new(db_pool.clone());
        let view_repo = ViewRepository::new(db_pool.clone());
        let category_repo = CategoryRepository::new(db_pool.clone());
        let asset_repo = AssetRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            config.jwt_secret.clone(),
            config.site_url.clone(),
            db_pool.clone(),
        );
        let user_service = UserService::new(
            user_repo,
            auth_service.clone(),
            config.storage_dir.clone(),
            config.public_base_url.clone(),
            db_pool.clone(),
        );
        let rack_service = RackService::new(RackRepository::new(db_pool.clone()), db_pool.clone());
        let task_service = TaskService::new(TaskRepository::new(db_pool.clone()), view_repo.clone(), db_pool.clone());
        let shift_service = ShiftChangeService::new(ShiftChangeRepository::new(db_pool.clone()), view_repo.clone());
        let leave_service = LeaveService::new(LeaveRepository::new(db_pool.clone()), view_repo);
        let category_service = CategoryService::new(category_repo.clone(), db_pool.clone());
        let asset_service = AssetService::new(asset_repo.clone(), category_repo, db_pool.clone());
        let password_service = PasswordService::new(PasswordRepository::new(db_pool.clone()));
        let document_service = DocumentService::new(
            TermRepository::new(db_pool.clone()),
            asset_repo,
            db_pool.clone(),
            config.templates_dir.clone(),
            config.fonts_dir.clone(),
        );
        let dashboard_service = DashboardService::new(DashboardRepository::new(db_pool.clone()));

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            user_service,
            rack_service,
            task_service,
            shift_service,
            leave_service,
            category_service,
            asset_service,
            password_service,
            document_service,
            dashboard_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/gestao"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.auto_archive_interval, Duration::from_secs(300));
        assert_eq!(config.storage_dir, PathBuf::from("./storage"));
        assert!(config.cors_origins.is_empty());
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/gestao")]));
        assert!(result.is_err());
    }

    #[test]
    fn lists_and_urls_are_normalized() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/gestao"),
            ("JWT_SECRET", "segredo"),
            ("SITE_URL", "https://ti.empresa.com.br/"),
            ("CORS_ORIGINS", "https://a.com, ,https://b.com"),
            ("BOOTSTRAP_ADMIN_EMAIL", "admin@empresa.com.br"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "trocar123"),
        ]))
        .unwrap();

        assert_eq!(config.site_url, "https://ti.empresa.com.br");
        assert_eq!(config.cors_origins, vec!["https://a.com", "https://b.com"]);
        assert_eq!(config.bootstrap_admin.unwrap().0, "admin@empresa.com.br");
    }
}
