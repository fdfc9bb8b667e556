//! Open-Meteo backend (keyless): geocoding, forecast, air quality.
//!
//! Open-Meteo has no reverse geocoding, so reverse lookups go to Nominatim.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;

use super::{ProviderKind, WeatherProvider, get_json, trim_base};
use crate::error::ApiError;
use crate::i18n::Language;
use crate::model::{
    AirQuality, Coordinates, CurrentConditions, DailyPoint, ForecastReport, HourlyPoint,
    LocationCandidate, MAX_DAILY_POINTS, MAX_HOURLY_POINTS,
};

const NAME: &str = "open-meteo";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct OpenMeteoEndpoints {
    pub geocoding: String,
    pub forecast: String,
    pub air_quality: String,
    /// Nominatim
    pub reverse: String,
}

impl Default for OpenMeteoEndpoints {
    fn default() -> Self {
        Self {
            geocoding: "https://geocoding-api.open-meteo.com".into(),
            forecast: "https://api.open-meteo.com".into(),
            air_quality: "https://air-quality-api.open-meteo.com".into(),
            reverse: "https://nominatim.openstreetmap.org".into(),
        }
    }
}

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    #[serde(default)]
    hourly: HourlyBlock,
    #[serde(default)]
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    precipitation: Option<f64>,
    surface_pressure: Option<f64>,
    weather_code: Option<u8>,
    uv_index: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: AirQualityBlock,
}

#[derive(Debug, Deserialize)]
struct AirQualityBlock {
    us_aqi: Option<f64>,
    pm10: Option<f64>,
    pm2_5: Option<f64>,
    ozone: Option<f64>,
    nitrogen_dioxide: Option<f64>,
    sulphur_dioxide: Option<f64>,
    carbon_monoxide: Option<f64>,
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    country_code: Option<String>,
}

// ============================================================================
// Provider
// ============================================================================

#[derive(Debug, Clone)]
pub struct OpenMeteo {
    http: Client,
    endpoints: OpenMeteoEndpoints,
}

impl OpenMeteo {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            endpoints: OpenMeteoEndpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: OpenMeteoEndpoints) -> Self {
        self.endpoints = OpenMeteoEndpoints {
            geocoding: trim_base(&endpoints.geocoding),
            forecast: trim_base(&endpoints.forecast),
            air_quality: trim_base(&endpoints.air_quality),
            reverse: trim_base(&endpoints.reverse),
        };
        self
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteo {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenMeteo
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        lang: Language,
    ) -> Result<Vec<LocationCandidate>, ApiError> {
        let url = format!(
            "{}/v1/search?name={}&count={}&language={}&format=json",
            self.endpoints.geocoding,
            urlencoding::encode(query),
            limit,
            lang.code()
        );
        let data: GeocodingResponse = get_json(&self.http, NAME, &url).await?;
        Ok(data
            .results
            .unwrap_or_default()
            .into_iter()
            .map(candidate_from_result)
            .collect())
    }

    async fn reverse(&self, coords: Coordinates, lang: Language) -> Result<Option<String>, ApiError> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1&zoom=10&accept-language={}",
            self.endpoints.reverse,
            coords.lat,
            coords.lon,
            lang.code()
        );
        let body: NominatimResponse = get_json(&self.http, "nominatim", &url).await?;
        Ok(body.address.and_then(label_from_address))
    }

    async fn forecast(&self, coords: Coordinates, _lang: Language) -> Result<ForecastReport, ApiError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}\
             &current=temperature_2m,apparent_temperature,relative_humidity_2m,wind_speed_10m,precipitation,surface_pressure,weather_code,uv_index\
             &hourly=temperature_2m,precipitation_probability\
             &daily=temperature_2m_max,precipitation_probability_max\
             &forecast_days={}&wind_speed_unit=ms&timezone=auto",
            self.endpoints.forecast, coords.lat, coords.lon, MAX_DAILY_POINTS
        );
        let data: ForecastResponse = get_json(&self.http, NAME, &url).await?;
        normalize(data)
    }

    async fn air_quality(&self, coords: Coordinates) -> Result<Option<AirQuality>, ApiError> {
        let url = format!(
            "{}/v1/air-quality?latitude={}&longitude={}\
             &current=us_aqi,pm10,pm2_5,ozone,nitrogen_dioxide,sulphur_dioxide,carbon_monoxide,uv_index",
            self.endpoints.air_quality, coords.lat, coords.lon
        );
        let data: AirQualityResponse = get_json(&self.http, NAME, &url).await?;
        let c = data.current;
        Ok(c.us_aqi.map(|aqi| AirQuality {
            aqi: aqi.round().max(0.0) as u32,
            pm10: c.pm10.unwrap_or(0.0),
            pm25: c.pm2_5.unwrap_or(0.0),
            o3: c.ozone.unwrap_or(0.0),
            no2: c.nitrogen_dioxide.unwrap_or(0.0),
            so2: c.sulphur_dioxide.unwrap_or(0.0),
            co: c.carbon_monoxide.unwrap_or(0.0),
            uv_index: c.uv_index,
        }))
    }
}

fn candidate_from_result(result: GeocodingResult) -> LocationCandidate {
    // Prefer the two-letter code so labels read "Paris, FR" for every provider
    let country = result
        .country_code
        .map(|code| code.to_uppercase())
        .or(result.country)
        .unwrap_or_default();
    let mut candidate = LocationCandidate::new(
        result.name,
        country,
        Coordinates::new(result.latitude, result.longitude),
    );
    candidate.state = result.admin1;
    candidate
}

fn label_from_address(address: NominatimAddress) -> Option<String> {
    let name = address
        .city
        .or(address.town)
        .or(address.village)
        .or(address.municipality)
        .or(address.county)?;
    Some(match address.country_code {
        Some(code) => format!("{}, {}", name, code.to_uppercase()),
        None => name,
    })
}

fn normalize(data: ForecastResponse) -> Result<ForecastReport, ApiError> {
    let current = data.current;
    let now = NaiveDateTime::parse_from_str(&current.time, TIME_FORMAT).map_err(|e| {
        ApiError::Decode {
            provider: NAME,
            message: format!("bad current time {:?}: {}", current.time, e),
        }
    })?;
    let this_hour = now.with_minute(0).unwrap_or(now);

    let hourly = data
        .hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            let time = NaiveDateTime::parse_from_str(t, TIME_FORMAT).ok()?;
            Some((i, time))
        })
        .filter(|(_, time)| *time >= this_hour)
        .take(MAX_HOURLY_POINTS)
        .map(|(i, time)| HourlyPoint {
            time: time.format("%H").to_string(),
            temperature: series_value(&data.hourly.temperature_2m, i),
            precipitation: series_value(&data.hourly.precipitation_probability, i),
        })
        .collect();

    let daily = data
        .daily
        .time
        .iter()
        .enumerate()
        .take(MAX_DAILY_POINTS)
        .map(|(i, day)| DailyPoint {
            day: NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(|d| d.format("%a").to_string())
                .unwrap_or_else(|_| day.clone()),
            temperature: series_value(&data.daily.temperature_2m_max, i),
            precipitation: series_value(&data.daily.precipitation_probability_max, i),
        })
        .collect();

    Ok(ForecastReport {
        current: CurrentConditions {
            temperature: current.temperature_2m,
            feels_like: current.apparent_temperature.unwrap_or(current.temperature_2m),
            humidity: current.relative_humidity_2m.unwrap_or(0.0),
            wind_speed: current.wind_speed_10m.unwrap_or(0.0),
            description: weather_description(current.weather_code.unwrap_or(0)).to_string(),
            precipitation: current.precipitation.unwrap_or(0.0),
            pressure: current.surface_pressure.unwrap_or(0.0),
            uv_index: 0.0,
        },
        uv_index: current.uv_index,
        daily,
        hourly,
    })
}

fn series_value(series: &[Option<f64>], index: usize) -> f64 {
    series.get(index).copied().flatten().unwrap_or(0.0)
}

/// Convert WMO weather code to human-readable description
pub fn weather_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}
