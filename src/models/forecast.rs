//! Daily summary and forecast result models

use crate::error::FailureKind;
use serde::{Deserialize, Serialize};

/// Location name used for every degraded result
pub const UNAVAILABLE_LOCATION: &str = "Unavailable";

/// Collapsed forecast for one calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailySummary {
    /// Local midnight of the day, as unix seconds
    pub day_start: i64,
    pub low_temp: f64,
    pub high_temp: f64,
    /// Advisory text, empty when nothing notable is expected
    pub advisory: String,
    /// Reported in the `windSpeed` slot of the response
    pub wind_metric: f64,
}

/// Outcome of a forecast lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastResult {
    /// Location name from the provider, or [`UNAVAILABLE_LOCATION`]
    pub location_name: String,
    /// Up to three days, ascending by `day_start`
    pub days: Vec<DailySummary>,
    /// Why the lookup degraded, set only on fallback results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ForecastResult {
    /// Create a successful result
    #[must_use]
    pub fn new(location_name: impl Into<String>, days: Vec<DailySummary>) -> Self {
        Self {
            location_name: location_name.into(),
            days,
            failure: None,
        }
    }

    /// The degraded result returned whenever a lookup fails
    #[must_use]
    pub fn unavailable(failure: Option<FailureKind>) -> Self {
        Self {
            location_name: UNAVAILABLE_LOCATION.to_string(),
            days: Vec::new(),
            failure,
        }
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.location_name == UNAVAILABLE_LOCATION && self.days.is_empty()
    }
}
