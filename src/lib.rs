pub mod api; // HTTP surface
pub mod auth;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod sessions;
pub mod storage;
pub mod verification; // KYC → accreditation → AML → funds

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Binary entry point: configure logging, open the archive, serve until
/// Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = config::AppConfig::from_env()?;
    tracing::debug!(?app_config, "Configuration loaded");

    let core = core_state::CoreState::from_config(&app_config)
        .map_err(|e| format!("Failed to initialize state: {e}"))?;

    let server = api::start_server_on(Arc::new(core), app_config.bind).await?;
    tracing::info!(addr = %server.info.server_addr, "Listening");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;

    server.stop().await;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
