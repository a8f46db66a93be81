use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shop_api::cli::Args;
use shop_api::config::AppConfig;
use shop_api::database::DatabaseManager;
use shop_api::server;
use shop_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    args.apply(&mut config);
    tracing::info!("Starting Shop API in {:?} mode", config.environment);

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open storage")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    let state = AppState::new(config, db)?;
    server::run(listener, state, server::shutdown_signal()).await
}
