//! Data models for the weather advisory service
//!
//! - Weather: raw provider samples
//! - Forecast: daily summaries and the externally visible result

pub mod forecast;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{DailySummary, ForecastResult, UNAVAILABLE_LOCATION};
pub use weather::ForecastSample;
