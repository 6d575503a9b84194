//! Equipment Inventory Server
//!
//! Serves the lending desk, the equipment admin pages and the JSON API.

use std::net::SocketAddr;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_server::{app, bootstrap, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("inventory_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Inventory Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    bootstrap::migrate_once(&pool, config.database.schema_lock_key)
        .await
        .context("Failed to create database schema")?;

    tracing::info!("Database schema ready");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let admin_username = config.security.admin_username.clone();
    let admin_password = config.security.admin_password.clone();

    let state = AppState::new(config, pool)?;

    if state.services.auth.seed_admin(&admin_username, &admin_password).await? {
        tracing::warn!("Created account {}; change its password or set ADMIN_PASSWORD", admin_username);
    }

    let app = app::build_router(state)?;

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
