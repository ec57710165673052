use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use weather_advisory::{AppConfig, ForecastService, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_from_path(config_path).context("Failed to load configuration")?;

    telemetry::init(&config.logging)?;
    tracing::info!(
        "Starting weather-advisory {} (cache: {} entries, {}s ttl)",
        weather_advisory::VERSION,
        config.cache.max_entries,
        config.cache.ttl_seconds
    );

    let service = Arc::new(
        ForecastService::from_config(&config).context("Failed to initialize forecast service")?,
    );

    web::run(&config, service).await
}
