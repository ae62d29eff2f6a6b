// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        DispatchRepository, DriverRepository, ProductRepository, ReportRepository, RouteRepository,
        UserRepository,
    },
    services::{
        auth::AuthService, dispatch_service::DispatchService, document_service::DocumentService,
        driver_service::DriverService, product_service::ProductService,
        report_service::ReportService, route_service::RouteService, user_service::UserService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FONTS_DIR: &str = "./fonts";
// Fotos de usuário chegam como data URI em base64
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Login administrativo que não passa pela tabela `usuarios`.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub dui: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub admin: Option<AdminCredentials>,
    pub fonts_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR inválido (esperado host:porta)")?;

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().context("DB_MAX_CONNECTIONS deve ser um inteiro")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(raw) => raw.parse::<usize>().context("MAX_BODY_BYTES deve ser um inteiro")?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        // Só liga o acesso administrativo com as duas variáveis presentes
        let admin = match (var("ADMIN_DUI"), var("ADMIN_PASSWORD")) {
            (Some(dui), Some(password)) => Some(AdminCredentials { dui, password }),
            _ => None,
        };

        let fonts_dir = PathBuf::from(var("FONTS_DIR").unwrap_or_else(|| DEFAULT_FONTS_DIR.to_string()));

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections,
            admin,
            fonts_dir,
            max_body_bytes,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: AppConfig,
    pub dispatch_service: DispatchService,
    pub report_service: ReportService,
    pub product_service: ProductService,
    pub route_service: RouteService,
    pub driver_service: DriverService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        if config.admin.is_none() {
            tracing::warn!("ADMIN_DUI/ADMIN_PASSWORD ausentes: login administrativo desativado");
        }

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());

        let dispatch_service = DispatchService::new(DispatchRepository::new(), db_pool.clone());
        let report_service = ReportService::new(ReportRepository::new(db_pool.clone()));
        let product_service = ProductService::new(ProductRepository::new(db_pool.clone()));
        let route_service = RouteService::new(RouteRepository::new(db_pool.clone()));
        let driver_service = DriverService::new(DriverRepository::new(db_pool.clone()));
        let user_service = UserService::new(user_repo.clone());
        let auth_service = AuthService::new(user_repo, config.admin.clone());
        let document_service = DocumentService::new(dispatch_service.clone(), config.fonts_dir.clone());

        Ok(Self {
            db_pool,
            config,
            dispatch_service,
            report_service,
            product_service,
            route_service,
            driver_service,
            user_service,
            auth_service,
            document_service,
        })
    }
}
