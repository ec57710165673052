//! Forecast orchestration
//!
//! Composes cache, client, parser and aggregator behind a single lookup that
//! always returns a result.

use crate::api::WeatherApiClient;
use crate::cache::{CacheStats, ForecastCache};
use crate::config::AppConfig;
use crate::models::ForecastResult;
use crate::Result;
use tracing::{info, instrument};

/// Forecast lookups backed by the response cache
pub struct ForecastService {
    client: WeatherApiClient,
    cache: ForecastCache,
}

impl ForecastService {
    #[must_use]
    pub fn new(client: WeatherApiClient, cache: ForecastCache) -> Self {
        Self { client, cache }
    }

    /// Build the client and cache described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = WeatherApiClient::new(config.weather.clone())?;
        let cache = ForecastCache::from_config(&config.cache);
        Ok(Self::new(client, cache))
    }

    /// Three-day forecast for a city, served from cache when fresh.
    ///
    /// Failed lookups yield the "Unavailable" result, which is cached like
    /// any other.
    #[instrument(skip(self))]
    pub async fn get_weather_for_city(
        &self,
        city: &str,
        country_code: Option<&str>,
    ) -> ForecastResult {
        let result = self
            .cache
            .get_or_compute(city, country_code, || self.client.fetch(city, country_code))
            .await;

        if let Some(kind) = result.failure {
            info!(failure = kind.as_str(), "Serving unavailable forecast for {}", city);
        }
        result
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
