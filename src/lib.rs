//! Weather advisory service
//!
//! Looks up a city's 5-day / 3-hour forecast from the weather provider and
//! condenses it into highs, lows and a travel advisory for each of the next
//! three days. Lookups are cached and never fail: provider errors degrade to
//! an "Unavailable" result.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod service;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::WeatherApiClient;
pub use cache::{CacheKey, CacheStats, ForecastCache};
pub use crate::config::AppConfig;
pub use error::{FailureKind, WeatherError};
pub use forecast::{Advisory, AggregationMode};
pub use models::{DailySummary, ForecastResult, ForecastSample};
pub use service::ForecastService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
