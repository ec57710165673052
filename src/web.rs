use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::{
    VERSION, WeatherError,
    cache::CacheStats,
    config::AppConfig,
    error::FailureKind,
    models::ForecastResult,
    service::ForecastService,
};

const MAX_BODY_BYTES: usize = 16 * 1024;

/// Headroom on top of the provider timeout before the server gives up
const TIMEOUT_HEADROOM: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl ForecastRequest {
    /// Trimmed city and country code, or a validation error
    pub fn validated(&self) -> crate::Result<(&str, Option<&str>)> {
        let city = self.city.trim();
        if city.is_empty() {
            return Err(WeatherError::validation("City is required"));
        }
        if !(2..=100).contains(&city.chars().count()) {
            return Err(WeatherError::validation(
                "City name must be between 2 and 100 characters",
            ));
        }

        let country_code = match self
            .country_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
        {
            Some(code) if !(2..=3).contains(&code.chars().count()) => {
                return Err(WeatherError::validation(
                    "Country code must be 2-3 characters",
                ));
            }
            other => other,
        };

        Ok((city, country_code))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiLocation {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiForecastEntry {
    pub dt: i64,
    pub low_temp: f64,
    pub high_temp: f64,
    pub description: String,
    pub wind_speed: f64,
}

/// Cache counters plus the derived hit rate
#[derive(Debug, Serialize)]
pub struct ApiCacheStats {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl From<CacheStats> for ApiCacheStats {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiForecastResponse {
    pub location: ApiLocation,
    pub forecast: Vec<ApiForecastEntry>,
}

impl From<&ForecastResult> for ApiForecastResponse {
    fn from(result: &ForecastResult) -> Self {
        Self {
            location: ApiLocation {
                name: result.location_name.clone(),
            },
            forecast: result
                .days
                .iter()
                .map(|day| ApiForecastEntry {
                    dt: day.day_start,
                    low_temp: day.low_temp,
                    high_temp: day.high_temp,
                    description: day.advisory.clone(),
                    wind_speed: day.wind_metric,
                })
                .collect(),
        }
    }
}

/// Errors surfaced to HTTP callers
pub struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(WeatherError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            WeatherError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let body = Json(json!({
            "error": code,
            "message": self.0.user_message(),
        }));
        (status, body).into_response()
    }
}

pub fn router(service: Arc<ForecastService>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/api/weather/forecast", post(get_forecast))
        .route("/api/weather/cache/stats", get(get_cache_stats))
        .route("/health", get(health))
        .with_state(service)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn get_forecast(
    State(service): State<Arc<ForecastService>>,
    request: Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<Json<ApiForecastResponse>, ApiError> {
    let Json(request) = request?;
    let (city, country_code) = request.validated()?;
    let city = city.to_string();
    let country_code = country_code.map(str::to_string);

    // Run detached so a disconnecting caller still populates the cache
    let lookup = tokio::spawn(async move {
        service
            .get_weather_for_city(&city, country_code.as_deref())
            .await
    });

    let result = lookup.await.unwrap_or_else(|e| {
        tracing::error!("Forecast lookup task failed: {}", e);
        ForecastResult::unavailable(Some(FailureKind::Service))
    });

    Ok(Json(ApiForecastResponse::from(&result)))
}

async fn get_cache_stats(State(service): State<Arc<ForecastService>>) -> Json<ApiCacheStats> {
    Json(ApiCacheStats::from(service.cache_stats().await))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

pub async fn run(config: &AppConfig, service: Arc<ForecastService>) -> Result<()> {
    let app = router(service, config.weather.timeout() + TIMEOUT_HEADROOM);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailySummary;

    fn request(city: &str, country_code: Option<&str>) -> ForecastRequest {
        ForecastRequest {
            city: city.to_string(),
            country_code: country_code.map(str::to_string),
        }
    }

    #[test]
    fn test_validation_accepts_city_and_country() {
        let req = request(" London ", Some("GB"));
        assert_eq!(req.validated().unwrap(), ("London", Some("GB")));
        assert_eq!(request("Rome", None).validated().unwrap(), ("Rome", None));
    }

    #[test]
    fn test_validation_rejects_bad_city() {
        assert!(request("", None).validated().is_err());
        assert!(request("   ", None).validated().is_err());
        assert!(request("X", None).validated().is_err());
        assert!(request(&"a".repeat(101), None).validated().is_err());
        assert!(request(&"a".repeat(100), None).validated().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_country_code() {
        assert!(request("Paris", Some("F")).validated().is_err());
        assert!(request("Paris", Some("FRAN")).validated().is_err());
        assert!(request("Paris", Some("FRA")).validated().is_ok());
        assert_eq!(request("Paris", Some(" ")).validated().unwrap(), ("Paris", None));
    }

    #[test]
    fn test_request_uses_camel_case() {
        let req: ForecastRequest =
            serde_json::from_str(r#"{"city":"Lima","countryCode":"PE"}"#).unwrap();
        assert_eq!(req.country_code.as_deref(), Some("PE"));
    }

    #[test]
    fn test_response_shape() {
        let result = ForecastResult::new(
            "London",
            vec![DailySummary {
                day_start: 1_737_676_800,
                low_temp: 277.5,
                high_temp: 281.0,
                advisory: "Carry umbrella".to_string(),
                wind_metric: 281.0,
            }],
        );
        let value = serde_json::to_value(ApiForecastResponse::from(&result)).unwrap();
        assert_eq!(
            value,
            json!({
                "location": {"name": "London"},
                "forecast": [{
                    "dt": 1_737_676_800_i64,
                    "lowTemp": 277.5,
                    "highTemp": 281.0,
                    "description": "Carry umbrella",
                    "windSpeed": 281.0
                }]
            })
        );
    }

    #[test]
    fn test_cache_stats_include_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            evictions: 0,
            expired: 0,
            entries: 1,
            capacity: 100,
        };
        let value = serde_json::to_value(ApiCacheStats::from(stats)).unwrap();
        assert_eq!(value["hits"], 3);
        assert_eq!(value["capacity"], 100);
        assert_eq!(value["hit_rate"], 75.0);
    }

    #[test]
    fn test_unavailable_response_shape() {
        let value =
            serde_json::to_value(ApiForecastResponse::from(&ForecastResult::unavailable(None)))
                .unwrap();
        assert_eq!(value, json!({"location": {"name": "Unavailable"}, "forecast": []}));
    }
}
