// =============================================================================
// Stock Terminal - Main Entry Point
// =============================================================================
//
// Loads the runtime config (falling back to defaults, and seeding the file
// when it is missing), then serves the chart API until Ctrl+C.
// =============================================================================

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stock_terminal::api;
use stock_terminal::app_state::AppState;
use stock_terminal::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "dashboard_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Stock Terminal starting up");

    let config_path =
        std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let config = match RuntimeConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, path = %config_path, "Failed to load config, using defaults");
            let defaults = RuntimeConfig::default();
            // Only seed a missing file; never overwrite one the user is editing.
            if !Path::new(&config_path).exists() {
                if let Err(e) = defaults.save(&config_path) {
                    warn!(error = %e, path = %config_path, "Failed to write default config");
                }
            }
            defaults
        }
    };

    info!(
        timeframes = config.timeframes.len(),
        aliases = config.aliases.len(),
        home_currency = %config.home_currency,
        "Configuration ready"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config)?);

    // ── 3. Start the API server ──────────────────────────────────────────
    let bind_addr =
        std::env::var("DASHBOARD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!(
        requests_served = state.requests_served(),
        "Stock Terminal shut down complete."
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, stopping gracefully");
}
