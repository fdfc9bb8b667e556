pub mod air_quality;
pub mod dashboard;
pub mod forecast;
pub mod location_header;
pub mod search_overlay;
pub mod weather_body;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use air_quality::{AirQualityPanel, AirQualityPanelProps};
pub use dashboard::{Dashboard, DashboardProps, ERROR_ICON};
pub use forecast::{ForecastPanel, ForecastPanelProps};
pub use location_header::{LocationHeader, LocationHeaderProps};
pub use search_overlay::{SearchOverlay, SearchOverlayProps};
pub use weather_body::{WeatherBody, WeatherBodyProps};
