use std::sync::Arc;

use pixelkit_admin_api::app::{app, AppState};
use pixelkit_admin_api::config;
use pixelkit_admin_api::database::{DatabaseManager, SqlAuditSink, SqlRoleStore};
use pixelkit_admin_api::gate::{AccessGate, AuditSink, GatePolicy, RoleStore};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_EMAILS, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting PixelKit admin API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set: sessions cannot be issued or verified");
    }

    let pool = match DatabaseManager::pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    let roles: Arc<dyn RoleStore> = Arc::new(SqlRoleStore::new(pool.clone()));
    let audit: Arc<dyn AuditSink> = Arc::new(SqlAuditSink::new(pool.clone()));
    let gate = Arc::new(AccessGate::new(
        GatePolicy::from_config(&config.admin),
        &config.admin.admin_emails,
        roles.clone(),
        audit,
    ));

    let state = AppState { pool, gate, roles };
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("PIXELKIT_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("PixelKit admin API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
