//! Provider payload parsing
//!
//! Turns the 5-day / 3-hour forecast body into [`ForecastSample`]s that the
//! daily aggregator consumes.

use crate::models::ForecastSample;

pub mod openweathermap;

pub use openweathermap::parse;

/// Location name and samples extracted from one provider response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedForecast {
    pub location_name: String,
    pub samples: Vec<ForecastSample>,
}
