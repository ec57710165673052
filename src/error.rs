//! Error types and handling for the weather advisory service

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of an outbound provider failure.
///
/// Carried on fallback results so the cause stays observable even though
/// callers always receive a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Provider answered 404 for the requested location
    NotFound,
    /// Provider body could not be parsed
    Parsing,
    /// Transport failure or any other non-success response
    Service,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::Parsing => "parsing",
            FailureKind::Service => "service",
        }
    }
}

/// Main error type for the weather advisory service
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The provider does not know the requested location
    #[error("Location not found: {location}")]
    NotFound { location: String },

    /// The provider response was not valid forecast JSON
    #[error("Parsing error: {message}")]
    Parsing { message: String },

    /// Transport-level or unexpected HTTP failure
    #[error("Service error: {message}")]
    Service { message: String },

    /// Malformed caller input
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherError {
    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(location: S) -> Self {
        Self::NotFound {
            location: location.into(),
        }
    }

    /// Create a new parsing error
    pub fn parsing<S: Into<String>>(message: S) -> Self {
        Self::Parsing {
            message: message.into(),
        }
    }

    /// Create a new service error
    pub fn service<S: Into<String>>(message: S) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Outbound failure classification, `None` for caller or setup errors
    #[must_use]
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            WeatherError::NotFound { .. } => Some(FailureKind::NotFound),
            WeatherError::Parsing { .. } => Some(FailureKind::Parsing),
            WeatherError::Service { .. } => Some(FailureKind::Service),
            WeatherError::Validation { .. } | WeatherError::Config { .. } => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::NotFound { location } => {
                format!("No forecast is available for '{location}'.")
            }
            WeatherError::Parsing { .. } => {
                "The weather provider returned data that could not be read.".to_string()
            }
            WeatherError::Service { .. } => {
                "Unable to reach the weather provider. Please try again later.".to_string()
            }
            WeatherError::Validation { message } => format!("Invalid input: {message}"),
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        Self::parsing(err.to_string())
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::service(format!("request timed out: {err}"))
        } else {
            Self::service(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WeatherError::not_found("Atlantis");
        assert!(matches!(err, WeatherError::NotFound { .. }));

        let err = WeatherError::parsing("unexpected token");
        assert!(matches!(err, WeatherError::Parsing { .. }));

        let err = WeatherError::validation("city is required");
        assert!(matches!(err, WeatherError::Validation { .. }));
    }

    #[test]
    fn test_outbound_kinds() {
        assert_eq!(
            WeatherError::not_found("x").kind(),
            Some(FailureKind::NotFound)
        );
        assert_eq!(WeatherError::parsing("x").kind(), Some(FailureKind::Parsing));
        assert_eq!(WeatherError::service("x").kind(), Some(FailureKind::Service));
        assert_eq!(WeatherError::validation("x").kind(), None);
        assert_eq!(WeatherError::config("x").kind(), None);
    }

    #[test]
    fn test_user_messages() {
        let err = WeatherError::not_found("Atlantis");
        assert!(err.user_message().contains("Atlantis"));

        let err = WeatherError::service("connection refused");
        assert!(err.user_message().contains("Unable to reach"));

        let err = WeatherError::validation("city too short");
        assert!(err.user_message().contains("city too short"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: WeatherError = json_err.into();
        assert!(matches!(err, WeatherError::Parsing { .. }));
    }
}
