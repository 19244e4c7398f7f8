pub mod api;
pub mod core;
pub mod orchestrator;
pub mod providers;
pub mod server;
pub mod snapshot;
pub mod store;

pub use crate::core::config;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::AppState;
use crate::config::AppConfig;
use crate::orchestrator::QuoteOrchestrator;
use crate::providers::AwesomeApiProvider;
use crate::store::DiskQuoteStore;

/// Reads the config file (explicit or default) and applies environment overrides.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    config.apply_env_overrides()?;
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Wires the upstream client and the on-disk store into the request pipeline.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let database_path = config.database_path()?;
    let store = DiskQuoteStore::open(&database_path)?;
    let source = AwesomeApiProvider::new(&config.upstream.base_url)
        .context("Failed to build upstream HTTP client")?;

    let orchestrator = QuoteOrchestrator::new(Arc::new(source), Arc::new(store), config);
    Ok(AppState::new(orchestrator))
}

pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("Cotacao server starting...");

    let config = load_config(config_path)?;
    let state = build_state(&config)?;
    let app = api::create_router(state);

    let listener = server::bind(&config.server).await?;
    info!("Server initialized on {}", listener.local_addr()?);

    server::serve(
        listener,
        app,
        server::shutdown_signal(),
        Duration::from_secs(config.server.shutdown_grace_secs),
    )
    .await
}
