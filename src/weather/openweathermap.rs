//! `OpenWeatherMap` forecast response structures and conversion
//!
//! Parsing is lenient: absent numbers become `0.0` and absent strings become
//! empty, so a sparse payload still yields samples. Only bodies that are not
//! JSON, or whose fields carry the wrong JSON type, are rejected.

use super::ParsedForecast;
use crate::Result;
use crate::models::ForecastSample;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForecastResponse {
    name: Option<String>,
    city: Option<CityInfo>,
    list: Option<Vec<ForecastEntry>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CityInfo {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForecastEntry {
    dt: Option<i64>,
    main: Option<MainData>,
    weather: Option<Vec<Condition>>,
    wind: Option<WindData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MainData {
    temp: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Condition {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WindData {
    speed: Option<f64>,
}

impl From<ForecastEntry> for ForecastSample {
    fn from(entry: ForecastEntry) -> Self {
        let main = entry.main.unwrap_or_default();
        let temperature = main.temp.unwrap_or(0.0);
        let description = entry
            .weather
            .and_then(|conditions| conditions.into_iter().next())
            .and_then(|condition| condition.description)
            .unwrap_or_default();

        ForecastSample {
            timestamp: entry.dt.unwrap_or(0),
            temperature,
            temp_min: main.temp_min.unwrap_or(temperature),
            temp_max: main.temp_max.unwrap_or(temperature),
            description,
            wind_speed: entry.wind.and_then(|w| w.speed).unwrap_or(0.0),
        }
    }
}

/// Parse a forecast body into its location name and samples.
///
/// The top-level `name` is preferred; `city.name` is used when it is absent.
pub fn parse(body: &str) -> Result<ParsedForecast> {
    let response: ForecastResponse = serde_json::from_str(body)?;

    let location_name = response
        .name
        .or_else(|| response.city.and_then(|city| city.name))
        .unwrap_or_default();

    let samples = response
        .list
        .unwrap_or_default()
        .into_iter()
        .map(ForecastSample::from)
        .collect();

    Ok(ParsedForecast {
        location_name,
        samples,
    })
}
