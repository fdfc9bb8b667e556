//! Provider-agnostic weather API layer
//!
//! Every backend implements [`WeatherProvider`] and normalizes its responses
//! into the types in [`crate::model`]. The free functions here are what the
//! effect handler calls; they map transport errors onto [`DashError`].

mod openmeteo;
mod openweathermap;
mod waqi;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ApiError, ConfigError, DashError};
use crate::i18n::Language;
use crate::model::{
    AirQuality, Coordinates, ForecastReport, LocationCandidate, Place, UNKNOWN_LOCATION,
    WeatherSnapshot,
};
use crate::state::MIN_SUGGEST_CHARS;

pub use openmeteo::{OpenMeteo, OpenMeteoEndpoints, weather_description};
pub use openweathermap::OpenWeatherMap;
pub use waqi::Waqi;

/// Candidates requested per lookup
pub const GEOCODE_LIMIT: usize = 5;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("weather-dash/", env!("CARGO_PKG_VERSION"));

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
pub enum ProviderKind {
    #[serde(rename = "openweathermap")]
    #[value(name = "openweathermap")]
    OpenWeatherMap,
    #[serde(rename = "open-meteo")]
    #[value(name = "open-meteo")]
    OpenMeteo,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenWeatherMap => "openweathermap",
            ProviderKind::OpenMeteo => "open-meteo",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One implementation per backend; the dashboard only sees this trait.
#[async_trait]
pub trait WeatherProvider: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ProviderKind;

    /// Forward geocoding, provider-ranked
    async fn search(
        &self,
        query: &str,
        limit: usize,
        lang: Language,
    ) -> Result<Vec<LocationCandidate>, ApiError>;

    /// Reverse geocoding to a "name, country" label
    async fn reverse(&self, coords: Coordinates, lang: Language)
        -> Result<Option<String>, ApiError>;

    /// Current conditions plus hourly and daily series
    async fn forecast(&self, coords: Coordinates, lang: Language)
        -> Result<ForecastReport, ApiError>;

    /// `Ok(None)` when the provider has no reading for this spot
    async fn air_quality(&self, coords: Coordinates) -> Result<Option<AirQuality>, ApiError>;
}

/// Build the HTTP client shared by all providers
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
}

/// Construct the configured provider.
pub fn build_provider(config: &Config, http: Client) -> Result<Arc<dyn WeatherProvider>, ConfigError> {
    let endpoints = &config.endpoints;
    let provider: Arc<dyn WeatherProvider> = match config.provider_kind() {
        ProviderKind::OpenWeatherMap => {
            let api_key = config
                .openweathermap_api_key
                .clone()
                .ok_or(ConfigError::MissingApiKey)?;
            let air = config
                .waqi_token
                .clone()
                .map(|token| Waqi::new(http.clone(), token).with_base_url(&endpoints.waqi));
            Arc::new(
                OpenWeatherMap::new(http, api_key)
                    .with_base_url(&endpoints.openweathermap)
                    .with_air_quality(air),
            )
        }
        ProviderKind::OpenMeteo => Arc::new(OpenMeteo::new(http).with_endpoints(OpenMeteoEndpoints {
            geocoding: endpoints.open_meteo_geocoding.clone(),
            forecast: endpoints.open_meteo_forecast.clone(),
            air_quality: endpoints.open_meteo_air_quality.clone(),
            reverse: endpoints.nominatim.clone(),
        })),
    };
    tracing::info!(provider = %provider.kind(), "weather provider ready");
    Ok(provider)
}

// ============================================================================
// Orchestration
// ============================================================================

/// Pick one candidate for `query`.
///
/// A case-insensitive exact match on `name` or `"name, country"` beats the
/// provider's first result.
pub fn choose_candidate(query: &str, candidates: Vec<LocationCandidate>) -> Option<LocationCandidate> {
    let wanted = query.trim().to_lowercase();
    let exact = candidates
        .iter()
        .position(|c| c.name.to_lowercase() == wanted || c.label().to_lowercase() == wanted);
    let mut candidates = candidates;
    match exact {
        Some(index) => Some(candidates.swap_remove(index)),
        None => candidates.into_iter().next(),
    }
}

/// Resolve free text to a single location.
pub async fn geocode(
    provider: &dyn WeatherProvider,
    query: &str,
    lang: Language,
) -> Result<LocationCandidate, DashError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(DashError::LocationNotFound);
    }

    let candidates = provider
        .search(query, GEOCODE_LIMIT, lang)
        .await
        .map_err(|e| {
            tracing::warn!(provider = %provider.kind(), query, error = %e, "geocoding failed");
            DashError::GeocodeFailed
        })?;

    tracing::debug!(query, count = candidates.len(), "geocoding candidates");
    choose_candidate(query, candidates).ok_or(DashError::LocationNotFound)
}

/// Candidates for the suggestion list; short input yields nothing.
pub async fn suggest(
    provider: &dyn WeatherProvider,
    query: &str,
    lang: Language,
) -> Result<Vec<LocationCandidate>, ApiError> {
    let query = query.trim();
    if query.chars().count() < MIN_SUGGEST_CHARS {
        return Ok(Vec::new());
    }
    provider.search(query, GEOCODE_LIMIT, lang).await
}

/// Label for coordinates, falling back to [`UNKNOWN_LOCATION`].
pub async fn reverse_label(provider: &dyn WeatherProvider, coords: Coordinates, lang: Language) -> String {
    match provider.reverse(coords, lang).await {
        Ok(Some(label)) => label,
        Ok(None) => UNKNOWN_LOCATION.to_string(),
        Err(e) => {
            tracing::warn!(%coords, error = %e, "reverse geocoding failed");
            UNKNOWN_LOCATION.to_string()
        }
    }
}

/// Fetch forecast and air quality concurrently and merge them.
///
/// Any rejected request fails the whole fetch; no partial snapshot escapes.
pub async fn fetch_snapshot(
    provider: &dyn WeatherProvider,
    place: Place,
    lang: Language,
) -> Result<WeatherSnapshot, DashError> {
    let coords = place.coords;
    let (forecast, air_quality) =
        tokio::try_join!(provider.forecast(coords, lang), provider.air_quality(coords)).map_err(
            |e| {
                tracing::warn!(provider = %provider.kind(), %coords, error = %e, "weather fetch failed");
                DashError::WeatherFetchFailed
            },
        )?;

    tracing::info!(place = %place.label, "weather snapshot loaded");
    Ok(WeatherSnapshot::assemble(place, forecast, air_quality))
}

/// Fetch for device coordinates, labelling the snapshot via reverse lookup.
pub async fn fetch_snapshot_here(
    provider: &dyn WeatherProvider,
    coords: Coordinates,
    lang: Language,
) -> Result<WeatherSnapshot, DashError> {
    let (snapshot, label) = tokio::join!(
        fetch_snapshot(provider, Place::new(UNKNOWN_LOCATION, coords), lang),
        reverse_label(provider, coords, lang),
    );
    let mut snapshot = snapshot?;
    snapshot.place.label = label;
    Ok(snapshot)
}

// ============================================================================
// HTTP helpers
// ============================================================================

/// GET `url` and decode a JSON body, treating non-2xx as an error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    provider: &'static str,
    url: &str,
) -> Result<T, ApiError> {
    // Query strings may carry API keys
    let endpoint = url.split('?').next().unwrap_or(url);
    tracing::debug!(provider, endpoint, "GET");

    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            provider,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        provider,
        message: e.to_string(),
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
