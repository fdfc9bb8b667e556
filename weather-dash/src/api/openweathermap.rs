//! OpenWeatherMap backend (geocoding, current weather, 5-day/3-hour forecast)

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::{ProviderKind, Waqi, WeatherProvider, get_json, trim_base};
use crate::error::ApiError;
use crate::i18n::Language;
use crate::model::{
    AirQuality, Coordinates, CurrentConditions, DailyPoint, ForecastReport, HourlyPoint,
    LocationCandidate, MAX_DAILY_POINTS, MAX_HOURLY_POINTS,
};

const NAME: &str = "openweathermap";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
/// 3-hour steps per day in the forecast list
const STEPS_PER_DAY: usize = 8;

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainBlock,
    #[serde(default)]
    wind: WindBlock,
    #[serde(default)]
    weather: Vec<Condition>,
    rain: Option<RainBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastEntry>,
    city: Option<CityBlock>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: EntryMain,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct EntryMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct CityBlock {
    /// Offset from UTC in seconds
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherMap {
    http: Client,
    api_key: String,
    base_url: String,
    air: Option<Waqi>,
}

impl OpenWeatherMap {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            air: None,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    /// Air quality comes from WAQI; without it readings are absent.
    pub fn with_air_quality(mut self, air: Option<Waqi>) -> Self {
        self.air = air;
        self
    }

    fn appid(&self) -> Result<String, ApiError> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey(NAME));
        }
        Ok(urlencoding::encode(&self.api_key).into_owned())
    }

    async fn current(&self, coords: Coordinates, lang: Language) -> Result<CurrentResponse, ApiError> {
        let url = format!(
            "{}/data/2.5/weather?lat={}&lon={}&units=metric&lang={}&appid={}",
            self.base_url,
            coords.lat,
            coords.lon,
            lang.code(),
            self.appid()?
        );
        get_json(&self.http, NAME, &url).await
    }

    async fn five_day(&self, coords: Coordinates, lang: Language) -> Result<ForecastResponse, ApiError> {
        let url = format!(
            "{}/data/2.5/forecast?lat={}&lon={}&units=metric&lang={}&appid={}",
            self.base_url,
            coords.lat,
            coords.lon,
            lang.code(),
            self.appid()?
        );
        get_json(&self.http, NAME, &url).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMap {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenWeatherMap
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        _lang: Language,
    ) -> Result<Vec<LocationCandidate>, ApiError> {
        let url = format!(
            "{}/geo/1.0/direct?q={}&limit={}&appid={}",
            self.base_url,
            urlencoding::encode(query),
            limit,
            self.appid()?
        );
        let results: Vec<GeoResult> = get_json(&self.http, NAME, &url).await?;
        Ok(results.into_iter().map(candidate_from_result).collect())
    }

    async fn reverse(&self, coords: Coordinates, _lang: Language) -> Result<Option<String>, ApiError> {
        let url = format!(
            "{}/geo/1.0/reverse?lat={}&lon={}&limit=1&appid={}",
            self.base_url,
            coords.lat,
            coords.lon,
            self.appid()?
        );
        let results: Vec<GeoResult> = get_json(&self.http, NAME, &url).await?;
        Ok(results
            .into_iter()
            .next()
            .map(|r| candidate_from_result(r).label()))
    }

    async fn forecast(&self, coords: Coordinates, lang: Language) -> Result<ForecastReport, ApiError> {
        let (current, forecast) =
            tokio::try_join!(self.current(coords, lang), self.five_day(coords, lang))?;
        Ok(normalize(current, forecast))
    }

    async fn air_quality(&self, coords: Coordinates) -> Result<Option<AirQuality>, ApiError> {
        match &self.air {
            Some(waqi) => waqi.reading(coords).await,
            None => Ok(None),
        }
    }
}

fn candidate_from_result(result: GeoResult) -> LocationCandidate {
    let mut candidate = LocationCandidate::new(
        result.name,
        result.country,
        Coordinates::new(result.lat, result.lon),
    );
    candidate.state = result.state;
    candidate
}

fn normalize(current: CurrentResponse, forecast: ForecastResponse) -> ForecastReport {
    let offset_secs = forecast.city.as_ref().map(|c| c.timezone).unwrap_or(0);
    let offset = FixedOffset::east_opt(offset_secs).unwrap_or(Utc.fix());

    let description = current
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_default();

    let daily = forecast
        .list
        .iter()
        .step_by(STEPS_PER_DAY)
        .take(MAX_DAILY_POINTS)
        .map(|entry| DailyPoint {
            day: local_label(entry.dt, offset, "%a"),
            temperature: entry.main.temp,
            precipitation: entry.pop * 100.0,
        })
        .collect();

    let hourly = forecast
        .list
        .iter()
        .take(MAX_HOURLY_POINTS)
        .map(|entry| HourlyPoint {
            time: local_label(entry.dt, offset, "%H"),
            temperature: entry.main.temp,
            precipitation: entry.pop * 100.0,
        })
        .collect();

    ForecastReport {
        current: CurrentConditions {
            temperature: current.main.temp,
            feels_like: current.main.feels_like,
            humidity: current.main.humidity,
            wind_speed: current.wind.speed,
            description,
            precipitation: current.rain.map(|r| r.one_hour).unwrap_or(0.0),
            pressure: current.main.pressure,
            uv_index: 0.0,
        },
        uv_index: None,
        daily,
        hourly,
    }
}

fn local_label(unix: i64, offset: FixedOffset, fmt: &str) -> String {
    DateTime::<Utc>::from_timestamp(unix, 0)
        .map(|dt| dt.with_timezone(&offset).format(fmt).to_string())
        .unwrap_or_default()
}
