//! Device location: the terminal stand-in for the browser geolocation API

use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::get_json;
use crate::error::DashError;
use crate::model::Coordinates;

pub const DEFAULT_IP_API_URL: &str = "http://ip-api.com";

/// How the "my location" action obtains coordinates
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Behaves like a browser without geolocation support
    Disabled,
    /// Approximate position from the public IP address
    #[default]
    Ip,
    /// Fixed coordinates from the config file
    Fixed { lat: f64, lon: f64 },
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Geolocator {
    mode: GeolocationMode,
    http: Client,
    ip_api_url: String,
}

impl Geolocator {
    pub fn new(mode: GeolocationMode, http: Client) -> Self {
        Self {
            mode,
            http,
            ip_api_url: DEFAULT_IP_API_URL.to_string(),
        }
    }

    pub fn with_ip_api_url(mut self, url: &str) -> Self {
        self.ip_api_url = crate::api::trim_base(url);
        self
    }

    pub async fn locate(&self) -> Result<Coordinates, DashError> {
        match &self.mode {
            GeolocationMode::Disabled => Err(DashError::GeolocationUnsupported),
            GeolocationMode::Fixed { lat, lon } => Ok(Coordinates::new(*lat, *lon)),
            GeolocationMode::Ip => self.locate_by_ip().await,
        }
    }

    async fn locate_by_ip(&self) -> Result<Coordinates, DashError> {
        let url = format!("{}/json/?fields=status,message,lat,lon", self.ip_api_url);
        let response: IpApiResponse = get_json(&self.http, "ip-api", &url)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "ip geolocation failed");
                DashError::GeolocationDenied(e.to_string())
            })?;

        match (response.status.as_str(), response.lat, response.lon) {
            ("success", Some(lat), Some(lon)) => {
                tracing::info!(lat, lon, "located device by ip");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(DashError::GeolocationDenied(
                response
                    .message
                    .unwrap_or_else(|| "position unavailable".to_string()),
            )),
        }
    }
}
