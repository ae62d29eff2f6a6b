//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::{cors::open_cors, trace::request_span};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let bind_addr = app_state.config.bind_addr;
    let app = build_router(app_state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(app_state: AppState) -> Router {
    let max_body_bytes = app_state.config.max_body_bytes;

    // Um POST por recurso; a ação vai no corpo
    let api_routes = Router::new()
        .route("/despachos", post(handlers::dispatches::handle_dispatches))
        .route("/despachos/{id}/pdf", get(handlers::documents::dispatch_sheet_pdf))
        .route("/productos", post(handlers::products::handle_products))
        .route("/rutas", post(handlers::routes::handle_routes))
        .route("/motoristas", post(handlers::drivers::handle_drivers))
        .route("/usuarios", post(handlers::users::handle_users))
        .route("/reportes", post(handlers::reports::handle_reports));

    // Caminhos antigos que o front-end React ainda chama
    let legacy_routes = Router::new()
        .route("/despachos.php", post(handlers::dispatches::handle_dispatches))
        .route("/productos.php", post(handlers::products::handle_products))
        .route("/rutas.php", post(handlers::routes::handle_routes))
        .route("/motoristas.php", post(handlers::drivers::handle_drivers))
        .route("/usuarios.php", post(handlers::users::handle_users))
        .route("/reportes.php", post(handlers::reports::handle_reports));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .nest("/server", legacy_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum_middleware::from_fn(open_cors))
        .layer(axum_middleware::from_fn(request_span))
        .with_state(app_state)
}
