//! Normalized domain types shared by every provider

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display label used when a reverse lookup yields nothing
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Upper bounds on forecast series length
pub const MAX_DAILY_POINTS: usize = 7;
pub const MAX_HOURLY_POINTS: usize = 24;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}°N, {:.2}°E", self.lat, self.lon)
    }
}

/// A geocoding hit, ranked by the provider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    /// Lower-case country identifier (used for flags / matching)
    pub country_code: String,
    pub state: Option<String>,
    pub coords: Coordinates,
}

impl LocationCandidate {
    pub fn new(name: impl Into<String>, country: impl Into<String>, coords: Coordinates) -> Self {
        let country = country.into();
        Self {
            name: name.into(),
            country_code: country.to_lowercase(),
            country,
            state: None,
            coords,
        }
    }

    /// "name, country"
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    pub fn to_place(&self) -> Place {
        Place {
            label: self.label(),
            coords: self.coords,
        }
    }
}

/// The location a snapshot was fetched for
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Place {
    pub label: String,
    pub coords: Coordinates,
}

impl Place {
    pub fn new(label: impl Into<String>, coords: Coordinates) -> Self {
        Self {
            label: label.into(),
            coords,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurrentConditions {
    /// °C
    pub temperature: f64,
    /// °C
    pub feels_like: f64,
    /// %
    pub humidity: f64,
    /// m/s
    pub wind_speed: f64,
    pub description: String,
    /// mm over the last hour
    pub precipitation: f64,
    /// hPa
    pub pressure: f64,
    pub uv_index: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyPoint {
    /// Short weekday, e.g. "Mon"
    pub day: String,
    pub temperature: f64,
    /// Probability of precipitation, 0-100
    pub precipitation: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HourlyPoint {
    /// Two-digit hour, e.g. "07"
    pub time: String,
    pub temperature: f64,
    /// Probability of precipitation, 0-100
    pub precipitation: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AirQuality {
    pub aqi: u32,
    pub pm10: f64,
    pub pm25: f64,
    pub o3: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    /// Some providers report UV alongside pollutants
    pub uv_index: Option<f64>,
}

impl AirQuality {
    pub fn category(&self) -> AqiCategory {
        AqiCategory::from_index(self.aqi)
    }

    /// (label, concentration) pairs in display order
    pub fn pollutants(&self) -> [(&'static str, f64); 6] {
        [
            ("PM10", self.pm10),
            ("PM2.5", self.pm25),
            ("O3", self.o3),
            ("NO2", self.no2),
            ("SO2", self.so2),
            ("CO", self.co),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_index(aqi: u32) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthySensitive,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

/// Forecast portion of a snapshot, as returned by a provider
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForecastReport {
    pub current: CurrentConditions,
    /// `None` when the provider has no UV reading of its own
    pub uv_index: Option<f64>,
    pub daily: Vec<DailyPoint>,
    pub hourly: Vec<HourlyPoint>,
}

/// Everything the dashboard shows for one place at one point in time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherSnapshot {
    pub place: Place,
    pub current: CurrentConditions,
    pub daily: Vec<DailyPoint>,
    pub hourly: Vec<HourlyPoint>,
    pub air_quality: Option<AirQuality>,
}

impl WeatherSnapshot {
    /// Merge a forecast and an optional air-quality reading.
    ///
    /// UV comes from the forecast when present, then the air-quality reading,
    /// then zero. Series are capped at [`MAX_DAILY_POINTS`] / [`MAX_HOURLY_POINTS`].
    pub fn assemble(place: Place, forecast: ForecastReport, air_quality: Option<AirQuality>) -> Self {
        let ForecastReport {
            mut current,
            uv_index,
            mut daily,
            mut hourly,
        } = forecast;

        current.uv_index = uv_index
            .or_else(|| air_quality.as_ref().and_then(|aq| aq.uv_index))
            .unwrap_or(0.0);
        daily.truncate(MAX_DAILY_POINTS);
        hourly.truncate(MAX_HOURLY_POINTS);

        Self {
            place,
            current,
            daily,
            hourly,
            air_quality,
        }
    }
}
