//! Weather API client for `OpenWeatherMap` integration
//!
//! Performs the single outbound forecast call, classifies failures into
//! not-found, parsing and service errors, and degrades every failure into the
//! "Unavailable" result so callers always receive a forecast.

use crate::config::WeatherConfig;
use crate::models::ForecastResult;
use crate::{Result, WeatherError, forecast, weather};
use chrono::{Local, NaiveDate};
use reqwest::{Client, StatusCode};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const USER_AGENT: &str = concat!("weather-advisory/", env!("CARGO_PKG_VERSION"));

/// Weather API client for the provider's 5-day / 3-hour forecast endpoint
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    /// HTTP client
    client: Client,
    /// Provider configuration
    config: WeatherConfig,
}

impl WeatherApiClient {
    /// Create a new weather API client
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// The `q` parameter: `city`, or `city,country` when a country is given
    #[must_use]
    pub fn location_query(city: &str, country_code: Option<&str>) -> String {
        match country_code.filter(|code| !code.trim().is_empty()) {
            Some(code) => format!("{city},{code}"),
            None => city.to_string(),
        }
    }

    /// Full request URL for a location
    #[must_use]
    pub fn request_url(&self, city: &str, country_code: Option<&str>) -> String {
        let location = Self::location_query(city, country_code);
        format!(
            "{}&q={}",
            self.config.forecast_url(),
            urlencoding::encode(&location)
        )
    }

    /// Fetch the next three days for a location, never failing.
    ///
    /// "Today" is the current date in the system's local time zone.
    pub async fn fetch(&self, city: &str, country_code: Option<&str>) -> ForecastResult {
        self.fetch_for(city, country_code, Local::now().date_naive())
            .await
    }

    /// Like [`fetch`](Self::fetch) with an explicit reference date
    #[instrument(skip(self), fields(aggregation = ?self.config.aggregation))]
    pub async fn fetch_for(
        &self,
        city: &str,
        country_code: Option<&str>,
        today: NaiveDate,
    ) -> ForecastResult {
        match self.try_fetch(city, country_code, today).await {
            Ok(result) => result,
            Err(err) => Self::fallback(city, &err),
        }
    }

    /// Fetch, parse and aggregate, surfacing the classified error
    pub async fn try_fetch(
        &self,
        city: &str,
        country_code: Option<&str>,
        today: NaiveDate,
    ) -> Result<ForecastResult> {
        let start_time = Instant::now();
        let body = self.fetch_body(city, country_code).await?;

        let parsed = weather::parse(&body).inspect_err(|e| {
            error!("Failed to parse forecast response for {}: {}", city, e);
        })?;

        let result = forecast::aggregate(
            &parsed.location_name,
            &parsed.samples,
            today,
            self.config.aggregation,
        );

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved forecast for {} ({} samples, {} days) in {:.3}s",
            result.location_name,
            parsed.samples.len(),
            result.days.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(result)
    }

    async fn fetch_body(&self, city: &str, country_code: Option<&str>) -> Result<String> {
        let location = Self::location_query(city, country_code);
        debug!("Requesting forecast for q={}", location);

        let response = self
            .client
            .get(self.request_url(city, country_code))
            .send()
            .await
            .inspect_err(|e| error!("Forecast request for {} failed: {}", location, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("Provider does not know location {}", location);
            return Err(WeatherError::not_found(location));
        }
        if !status.is_success() {
            error!("Provider returned {} for {}", status, location);
            return Err(WeatherError::service(format!(
                "provider returned HTTP {status}"
            )));
        }

        Ok(response.text().await?)
    }

    /// The degraded result for a failed lookup
    #[must_use]
    pub fn fallback(city: &str, err: &WeatherError) -> ForecastResult {
        warn!("Falling back to unavailable forecast for {}: {}", city, err);
        ForecastResult::unavailable(err.kind())
    }
}
