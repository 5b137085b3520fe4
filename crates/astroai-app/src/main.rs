use std::path::PathBuf;

use anyhow::{Result, anyhow};
use astroai_infrastructure::{AstroPaths, ServiceType};

mod app;
mod logging;

/// Overrides the data directory (config, secrets, store, logs).
const HOME_ENV: &str = "ASTROAI_HOME";

#[tokio::main]
async fn main() -> Result<()> {
    let base = std::env::var_os(HOME_ENV).map(PathBuf::from);
    let paths = AstroPaths::new(base.as_deref()).map_err(|e| anyhow!("Failed to resolve paths: {}", e))?;
    let _log_guard = logging::init(&paths.get_path(ServiceType::Logs))?;

    let boot = app::bootstrap(base.as_deref()).await?;
    let state = boot.app_state;
    tracing::info!("[Startup] Data directory: {}", state.paths.base_dir().display());

    match state.flows.start().await {
        Some(route) => tracing::info!("[Startup] Initial route: {:?}", route),
        None => tracing::warn!("[Startup] Initial route was already taken"),
    }

    let features = &state.config.features;
    tracing::debug!(?features, "[Startup] Feature flags");
    println!("{}", serde_json::to_string_pretty(&state.controller().snapshot())?);
    Ok(())
}
