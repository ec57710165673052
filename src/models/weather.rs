//! Raw forecast sample model

use serde::{Deserialize, Serialize};

/// A single 3-hour provider forecast step
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSample {
    /// Unix timestamp (seconds) the sample is valid for
    pub timestamp: i64,
    /// Temperature as reported by the provider
    pub temperature: f64,
    /// Minimum temperature within the step, `temperature` when not reported
    pub temp_min: f64,
    /// Maximum temperature within the step, `temperature` when not reported
    pub temp_max: f64,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Wind speed as reported by the provider
    pub wind_speed: f64,
}

impl ForecastSample {
    /// Create a sample whose min/max equal its temperature
    #[must_use]
    pub fn new(timestamp: i64, temperature: f64, description: impl Into<String>, wind_speed: f64) -> Self {
        Self {
            timestamp,
            temperature,
            temp_min: temperature,
            temp_max: temperature,
            description: description.into(),
            wind_speed,
        }
    }

    /// Case-insensitive check against the description
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
    }
}
