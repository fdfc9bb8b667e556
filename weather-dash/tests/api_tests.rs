//! HTTP client tests against WireMock servers

use pretty_assertions::assert_eq;
use reqwest::Client;
use serde_json::{Value, json};
use weather_dash::{
    api::{self, OpenMeteo, OpenMeteoEndpoints, OpenWeatherMap, Waqi, WeatherProvider},
    error::DashError,
    geolocation::{GeolocationMode, Geolocator},
    i18n::Language,
    model::{Coordinates, MAX_DAILY_POINTS, MAX_HOURLY_POINTS, Place, UNKNOWN_LOCATION},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

const LONDON: Coordinates = Coordinates {
    lat: 51.5074,
    lon: -0.1278,
};

fn owm(server: &MockServer) -> OpenWeatherMap {
    OpenWeatherMap::new(Client::new(), "test-key".into()).with_base_url(&server.uri())
}

fn london_geo_response() -> Value {
    json!([
        {"name": "London", "lat": 51.5074, "lon": -0.1278, "country": "GB", "state": "England"},
        {"name": "London", "lat": 42.9834, "lon": -81.233, "country": "CA", "state": "Ontario"}
    ])
}

fn owm_current_response() -> Value {
    json!({
        "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
        "main": {"temp": 12.3, "feels_like": 11.1, "humidity": 81, "pressure": 1009},
        "wind": {"speed": 5.2},
        "rain": {"1h": 0.6},
        "name": "London"
    })
}

/// 40 three-hour steps starting Monday 2024-01-01 00:00 UTC
fn owm_forecast_response() -> Value {
    let list: Vec<Value> = (0..40)
        .map(|i| {
            json!({
                "dt": 1_704_067_200 + i * 3 * 3600,
                "main": {"temp": 10.0 + i as f64 * 0.5},
                "pop": 0.2
            })
        })
        .collect();
    json!({"list": list, "city": {"name": "London", "timezone": 0}})
}

async fn mount_owm_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owm_current_response()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owm_forecast_response()))
        .mount(server)
        .await;
}

fn waqi_feed_response() -> Value {
    json!({
        "status": "ok",
        "data": {
            "aqi": 42,
            "iaqi": {
                "pm25": {"v": 12.0},
                "pm10": {"v": 20.0},
                "no2": {"v": 8.5},
                "uvi": {"v": 3.0}
            }
        }
    })
}

fn open_meteo(server: &MockServer) -> OpenMeteo {
    let uri = server.uri();
    OpenMeteo::new(Client::new()).with_endpoints(OpenMeteoEndpoints {
        geocoding: uri.clone(),
        forecast: uri.clone(),
        air_quality: uri.clone(),
        reverse: uri,
    })
}

fn open_meteo_forecast_response() -> Value {
    let hours: Vec<String> = (0..48)
        .map(|h| format!("2024-06-{:02}T{:02}:00", 1 + h / 24, h % 24))
        .collect();
    let temps: Vec<f64> = (0..48).map(|h| h as f64).collect();
    json!({
        "current": {
            "time": "2024-06-01T10:15",
            "temperature_2m": 18.4,
            "apparent_temperature": 17.9,
            "relative_humidity_2m": 64,
            "wind_speed_10m": 3.4,
            "precipitation": 0.0,
            "surface_pressure": 1015.2,
            "weather_code": 2,
            "uv_index": 5.1
        },
        "hourly": {
            "time": hours,
            "temperature_2m": temps,
            "precipitation_probability": vec![10; 48]
        },
        "daily": {
            "time": ["2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04",
                     "2024-06-05", "2024-06-06", "2024-06-07"],
            "temperature_2m_max": [21.0, 22.0, 23.0, 19.0, 18.0, 20.0, 24.0],
            "precipitation_probability_max": [0, 10, 20, 80, 60, 30, 5]
        }
    })
}

// =============================================================================
// OpenWeatherMap
// =============================================================================

#[tokio::test]
async fn test_owm_geocode_picks_exact_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geo_response()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = owm(&server);
    let candidate = api::geocode(&provider, "London", Language::En).await.unwrap();

    assert_eq!(candidate.name, "London");
    assert_eq!(candidate.country, "GB");
    assert_eq!(candidate.country_code, "gb");
    assert_eq!(candidate.state.as_deref(), Some("England"));
    assert_eq!(candidate.label(), "London, GB");
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geo_response()))
        .expect(0)
        .mount(&server)
        .await;

    let provider = owm(&server);
    let result = api::geocode(&provider, "   ", Language::En).await;

    assert_eq!(result, Err(DashError::LocationNotFound));
}

#[tokio::test]
async fn test_no_geocode_results_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = api::geocode(&owm(&server), "Xyzzyville", Language::En).await;
    assert_eq!(result, Err(DashError::LocationNotFound));
}

#[tokio::test]
async fn test_geocode_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"cod":401}"#))
        .mount(&server)
        .await;

    let result = api::geocode(&owm(&server), "London", Language::En).await;
    assert_eq!(result, Err(DashError::GeocodeFailed));
}

#[tokio::test]
async fn test_owm_snapshot_with_waqi() {
    let server = MockServer::start().await;
    mount_owm_weather(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/feed/geo:.*"))
        .and(query_param("token", "waqi-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(waqi_feed_response()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = owm(&server).with_air_quality(Some(
        Waqi::new(Client::new(), "waqi-token".into()).with_base_url(&server.uri()),
    ));
    let place = Place::new("London, GB", LONDON);
    let snapshot = api::fetch_snapshot(&provider, place.clone(), Language::En)
        .await
        .unwrap();

    assert_eq!(snapshot.place, place);
    assert_eq!(snapshot.current.temperature, 12.3);
    assert_eq!(snapshot.current.description, "light rain");
    assert_eq!(snapshot.current.precipitation, 0.6);
    assert_eq!(snapshot.current.uv_index, 3.0);
    assert!(snapshot.daily.len() <= MAX_DAILY_POINTS);
    assert_eq!(snapshot.daily[0].day, "Mon");
    assert_eq!(snapshot.hourly.len(), MAX_HOURLY_POINTS);
    assert_eq!(snapshot.hourly[0].precipitation, 20.0);

    let aq = snapshot.air_quality.unwrap();
    assert_eq!(aq.aqi, 42);
    assert_eq!(aq.pm25, 12.0);
    assert_eq!(aq.so2, 0.0);
}

#[tokio::test]
async fn test_owm_without_waqi_has_no_air_quality() {
    let server = MockServer::start().await;
    mount_owm_weather(&server).await;

    let snapshot = api::fetch_snapshot(&owm(&server), Place::new("London, GB", LONDON), Language::En)
        .await
        .unwrap();

    assert_eq!(snapshot.air_quality, None);
    assert_eq!(snapshot.current.uv_index, 0.0);
}

#[tokio::test]
async fn test_failed_forecast_fails_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owm_current_response()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result =
        api::fetch_snapshot(&owm(&server), Place::new("London, GB", LONDON), Language::En).await;
    assert_eq!(result, Err(DashError::WeatherFetchFailed));
}

#[tokio::test]
async fn test_failed_air_quality_fails_fetch() {
    let server = MockServer::start().await;
    mount_owm_weather(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/feed/.*"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = owm(&server).with_air_quality(Some(
        Waqi::new(Client::new(), "waqi-token".into()).with_base_url(&server.uri()),
    ));
    let result = api::fetch_snapshot(&provider, Place::new("London, GB", LONDON), Language::En).await;
    assert_eq!(result, Err(DashError::WeatherFetchFailed));
}

#[tokio::test]
async fn test_waqi_error_status_means_no_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/feed/.*"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "error", "data": "Unknown station"})),
        )
        .mount(&server)
        .await;

    let waqi = Waqi::new(Client::new(), "waqi-token".into()).with_base_url(&server.uri());
    assert_eq!(waqi.reading(LONDON).await.unwrap(), None);
}

#[tokio::test]
async fn test_snapshot_here_uses_reverse_label() {
    let server = MockServer::start().await;
    mount_owm_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Westminster", "lat": 51.5, "lon": -0.13, "country": "GB"}
        ])))
        .mount(&server)
        .await;

    let snapshot = api::fetch_snapshot_here(&owm(&server), LONDON, Language::En)
        .await
        .unwrap();
    assert_eq!(snapshot.place.label, "Westminster, GB");
    assert_eq!(snapshot.place.coords, LONDON);
}

#[tokio::test]
async fn test_snapshot_here_falls_back_to_unknown() {
    let server = MockServer::start().await;
    mount_owm_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let snapshot = api::fetch_snapshot_here(&owm(&server), LONDON, Language::En)
        .await
        .unwrap();
    assert_eq!(snapshot.place.label, UNKNOWN_LOCATION);
}

#[tokio::test]
async fn test_language_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lang", "hi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owm_current_response()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lang", "hi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owm_forecast_response()))
        .expect(1)
        .mount(&server)
        .await;

    api::fetch_snapshot(&owm(&server), Place::new("London, GB", LONDON), Language::Hi)
        .await
        .unwrap();
}

// =============================================================================
// Open-Meteo
// =============================================================================

#[tokio::test]
async fn test_open_meteo_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Par"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"name": "Paris", "latitude": 48.8566, "longitude": 2.3522,
                 "country": "France", "country_code": "FR", "admin1": "Île-de-France"},
                {"name": "Parma", "latitude": 44.8, "longitude": 10.33,
                 "country": "Italy", "country_code": "IT"}
            ]
        })))
        .mount(&server)
        .await;

    let results = api::suggest(&open_meteo(&server), "Par", Language::En)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label(), "Paris, FR");
    assert_eq!(results[1].country_code, "it");
}

#[tokio::test]
async fn test_short_suggestion_query_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let results = api::suggest(&open_meteo(&server), "Pa", Language::En)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_open_meteo_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_forecast_response()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {"us_aqi": 57.4, "pm10": 18.0, "pm2_5": 9.5, "ozone": 60.0,
                        "nitrogen_dioxide": 11.0, "sulphur_dioxide": 2.0,
                        "carbon_monoxide": 180.0, "uv_index": 4.0}
        })))
        .mount(&server)
        .await;

    let provider = open_meteo(&server);
    let place = Place::new("Paris, FR", Coordinates::new(48.8566, 2.3522));
    let snapshot = api::fetch_snapshot(&provider, place, Language::En)
        .await
        .unwrap();

    assert_eq!(snapshot.current.temperature, 18.4);
    assert_eq!(snapshot.current.description, "Partly cloudy");
    // Forecast UV wins over the air-quality reading
    assert_eq!(snapshot.current.uv_index, 5.1);
    assert_eq!(snapshot.daily.len(), MAX_DAILY_POINTS);
    assert_eq!(snapshot.daily[0].day, "Sat");
    assert_eq!(snapshot.daily[3].precipitation, 80.0);
    assert_eq!(snapshot.hourly.len(), MAX_HOURLY_POINTS);
    assert_eq!(snapshot.hourly[0].time, "10");

    let aq = snapshot.air_quality.unwrap();
    assert_eq!(aq.aqi, 57);
    assert_eq!(aq.category().label(), "Moderate");
}

#[tokio::test]
async fn test_open_meteo_reverse_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("accept-language", "bn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": {"town": "Shantiniketan", "country_code": "in"}
        })))
        .mount(&server)
        .await;

    let provider = open_meteo(&server);
    let label = provider
        .reverse(Coordinates::new(23.68, 87.68), Language::Bn)
        .await
        .unwrap();
    assert_eq!(label.as_deref(), Some("Shantiniketan, IN"));
}

// =============================================================================
// Geolocation
// =============================================================================

#[tokio::test]
async fn test_ip_geolocation_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "lat": 40.7128, "lon": -74.006
        })))
        .mount(&server)
        .await;

    let locator = Geolocator::new(GeolocationMode::Ip, Client::new()).with_ip_api_url(&server.uri());
    assert_eq!(locator.locate().await, Ok(Coordinates::new(40.7128, -74.006)));
}

#[tokio::test]
async fn test_ip_geolocation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail", "message": "reserved range"
        })))
        .mount(&server)
        .await;

    let locator = Geolocator::new(GeolocationMode::Ip, Client::new()).with_ip_api_url(&server.uri());
    assert_eq!(
        locator.locate().await,
        Err(DashError::GeolocationDenied("reserved range".into()))
    );
}

#[tokio::test]
async fn test_disabled_and_fixed_geolocation() {
    let disabled = Geolocator::new(GeolocationMode::Disabled, Client::new());
    assert_eq!(
        disabled.locate().await,
        Err(DashError::GeolocationUnsupported)
    );

    let fixed = Geolocator::new(GeolocationMode::Fixed { lat: 1.5, lon: 2.5 }, Client::new());
    assert_eq!(fixed.locate().await, Ok(Coordinates::new(1.5, 2.5)));
}
