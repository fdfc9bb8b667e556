//! On-disk configuration (`config.toml`) with environment overrides

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::ProviderKind;
use crate::error::ConfigError;
use crate::geolocation::{DEFAULT_IP_API_URL, GeolocationMode};
use crate::i18n::Language;

pub const OPENWEATHERMAP_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";
pub const WAQI_TOKEN_VAR: &str = "WAQI_TOKEN";

/// Example:
///
/// ```toml
/// provider = "openweathermap"
/// openweathermap_api_key = "..."
/// waqi_token = "..."
/// language = "hi"
/// dark_mode = true
/// city = "London"
///
/// [geolocation]
/// mode = "fixed"
/// lat = 51.5
/// lon = -0.12
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unset: OpenWeatherMap when a key is available, Open-Meteo otherwise
    pub provider: Option<ProviderKind>,
    pub openweathermap_api_key: Option<String>,
    pub waqi_token: Option<String>,
    pub language: Language,
    pub dark_mode: bool,
    /// Searched on startup
    pub city: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub geolocation: GeolocationMode,
    pub log_file: Option<PathBuf>,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub openweathermap: String,
    pub waqi: String,
    pub open_meteo_geocoding: String,
    pub open_meteo_forecast: String,
    pub open_meteo_air_quality: String,
    pub nominatim: String,
    pub ip_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        let open_meteo = crate::api::OpenMeteoEndpoints::default();
        Self {
            openweathermap: "https://api.openweathermap.org".into(),
            waqi: "https://api.waqi.info".into(),
            open_meteo_geocoding: open_meteo.geocoding,
            open_meteo_forecast: open_meteo.forecast,
            open_meteo_air_quality: open_meteo.air_quality,
            nominatim: open_meteo.reverse,
            ip_api: DEFAULT_IP_API_URL.into(),
        }
    }
}

impl Config {
    /// Load from `path` (or the default location), then apply env overrides.
    /// A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?
            }
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Environment values win over file values
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(OPENWEATHERMAP_KEY_VAR).filter(|v| !v.trim().is_empty()) {
            self.openweathermap_api_key = Some(key);
        }
        if let Some(token) = lookup(WAQI_TOKEN_VAR).filter(|v| !v.trim().is_empty()) {
            self.waqi_token = Some(token);
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("weather-dash").join("config.toml"))
    }

    pub fn provider_kind(&self) -> ProviderKind {
        match self.provider {
            Some(kind) => kind,
            None if self.openweathermap_api_key.is_some() => ProviderKind::OpenWeatherMap,
            None => ProviderKind::OpenMeteo,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs_next::cache_dir()
                .map(|dir| dir.join("weather-dash"))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("weather-dash.log")
        })
    }
}
