//! Configuration management for the weather advisory service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherError;
use crate::forecast::AggregationMode;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `WEATHER__WEATHER__API_KEY`
const ENV_PREFIX: &str = "WEATHER";

/// Separator between the prefix and each nested key
const ENV_SEPARATOR: &str = "__";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider API key, sent as `appid`
    #[serde(default)]
    pub api_key: String,
    /// Forecast endpoint, e.g. `https://api.openweathermap.org/data/2.5/forecast`
    #[serde(default)]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// How daily lows, highs and wind are derived
    #[serde(default)]
    pub aggregation: AggregationMode,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live after write, in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached locations
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_timeout() -> u32 {
    10
}

fn default_cache_ttl() -> u64 {
    10 * 60
}

fn default_cache_max_entries() -> usize {
    100
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            timeout_seconds: default_weather_timeout(),
            aggregation: AggregationMode::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// Forecast endpoint with credentials and sample count, ready for `&q=`
    #[must_use]
    pub fn forecast_url(&self) -> String {
        format!("{}?appid={}&cnt=72", self.base_url, self.api_key)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-advisory").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl();
        }
        if self.cache.max_entries == 0 {
            self.cache.max_entries = default_cache_max_entries();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<(), WeatherError> {
        self.validate_provider()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate provider credentials and endpoint
    pub fn validate_provider(&self) -> Result<(), WeatherError> {
        if self.weather.api_key.trim().is_empty() {
            return Err(WeatherError::config(
                "Weather API key is required. Set weather.api_key or WEATHER__WEATHER__API_KEY.",
            ));
        }

        if self.weather.base_url.trim().is_empty() {
            return Err(WeatherError::config(
                "Weather API base URL is required. Set weather.base_url or WEATHER__WEATHER__BASE_URL.",
            ));
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(WeatherError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            ));
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<(), WeatherError> {
        if self.weather.timeout_seconds > 300 {
            return Err(WeatherError::config(
                "Weather API timeout cannot exceed 300 seconds",
            ));
        }

        if self.cache.ttl_seconds > 24 * 60 * 60 {
            return Err(WeatherError::config(
                "Cache TTL cannot exceed 86400 seconds (1 day)",
            ));
        }

        if self.cache.max_entries > 100_000 {
            return Err(WeatherError::config(
                "Cache max entries cannot exceed 100000",
            ));
        }

        if self.server.port == 0 {
            return Err(WeatherError::config("Server port must be non-zero"));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<(), WeatherError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        Ok(())
    }
}
