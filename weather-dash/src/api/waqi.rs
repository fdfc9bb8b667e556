//! World Air Quality Index (aqicn.org) feed

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{get_json, trim_base};
use crate::error::ApiError;
use crate::model::{AirQuality, Coordinates};

const NAME: &str = "waqi";
const DEFAULT_BASE_URL: &str = "https://api.waqi.info";

/// `data` is an object on success and an error string otherwise
#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    /// Number, or "-" when the station has no index
    aqi: Value,
    #[serde(default)]
    iaqi: Pollutants,
}

#[derive(Debug, Default, Deserialize)]
struct Pollutants {
    pm10: Option<Reading>,
    pm25: Option<Reading>,
    o3: Option<Reading>,
    no2: Option<Reading>,
    so2: Option<Reading>,
    co: Option<Reading>,
    uvi: Option<Reading>,
}

#[derive(Debug, Deserialize)]
struct Reading {
    v: f64,
}

fn value_of(reading: &Option<Reading>) -> f64 {
    reading.as_ref().map(|r| r.v).unwrap_or(0.0)
}

#[derive(Debug, Clone)]
pub struct Waqi {
    http: Client,
    token: String,
    base_url: String,
}

impl Waqi {
    pub fn new(http: Client, token: String) -> Self {
        Self {
            http,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    /// Nearest-station reading; `Ok(None)` when the feed has nothing usable.
    pub async fn reading(&self, coords: Coordinates) -> Result<Option<AirQuality>, ApiError> {
        let url = format!(
            "{}/feed/geo:{};{}/?token={}",
            self.base_url,
            coords.lat,
            coords.lon,
            urlencoding::encode(&self.token)
        );
        let response: FeedResponse = get_json(&self.http, NAME, &url).await?;
        Ok(parse_feed(response))
    }
}

fn parse_feed(response: FeedResponse) -> Option<AirQuality> {
    if response.status != "ok" {
        tracing::debug!(status = %response.status, data = %response.data, "no air quality reading");
        return None;
    }

    let data: FeedData = match serde_json::from_value(response.data) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "malformed air quality feed");
            return None;
        }
    };
    let aqi = data.aqi.as_f64()?;

    let iaqi = &data.iaqi;
    Some(AirQuality {
        aqi: aqi.round().max(0.0) as u32,
        pm10: value_of(&iaqi.pm10),
        pm25: value_of(&iaqi.pm25),
        o3: value_of(&iaqi.o3),
        no2: value_of(&iaqi.no2),
        so2: value_of(&iaqi.so2),
        co: value_of(&iaqi.co),
        uv_index: iaqi.uvi.as_ref().map(|r| r.v),
    })
}
