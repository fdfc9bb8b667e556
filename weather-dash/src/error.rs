//! Error types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Transport-level failures from a provider call
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected response from {provider}: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),
}

/// User-visible failures; exactly one is shown at a time
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DashError {
    #[error("Location not found")]
    LocationNotFound,
    #[error("Failed to search location")]
    GeocodeFailed,
    #[error("Failed to fetch weather data")]
    WeatherFetchFailed,
    #[error("Failed to get your location: {0}")]
    GeolocationDenied(String),
    #[error("Geolocation is not supported")]
    GeolocationUnsupported,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error(
        "OpenWeatherMap needs an API key; set `openweathermap_api_key` in the config file or OPENWEATHERMAP_API_KEY"
    )]
    MissingApiKey,
}
