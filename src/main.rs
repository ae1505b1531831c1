mod config;
mod middleware;
mod models;
mod routes;
mod services;
mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::scrapers::{Provider, ScraperManager, SxyprnProvider};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub scrapers: ScraperManager,
}

/// Providers registered at startup
fn build_providers(config: &Config) -> anyhow::Result<Vec<Arc<dyn Provider>>> {
    let timeout = Duration::from_millis(config.scraper_timeout_ms);

    let sxyprn: Arc<dyn Provider> =
        Arc::new(SxyprnProvider::new(&config.sxyprn_api_url, timeout)?);

    Ok(vec![sxyprn])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Initialize tracing/logging
    telemetry::init(&config.log_level);

    tracing::info!(
        tag = telemetry::GOONIO,
        "{} Addon v{} starting up",
        config.addon_name,
        config.addon_version
    );

    let scrapers = ScraperManager::new(build_providers(&config)?);
    let (host, port) = (config.host.clone(), config.port);

    // Build application state
    let state = Arc::new(AppState { config, scrapers });

    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(tag = telemetry::GOONIO, "Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(tag = telemetry::GOONIO, "Addon shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
