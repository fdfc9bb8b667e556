//! Actions: user intents and async results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::DashError;
use crate::model::{Coordinates, LocationCandidate, WeatherSnapshot};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Search category =====
    /// Open the location search overlay
    SearchOpen,

    /// Close search overlay (cancel)
    SearchClose,

    /// Search input text changed
    SearchInputChange(String),

    /// Commit the raw text: geocode, then fetch
    SearchSubmit(String),

    /// Result: geocoding chose a location
    SearchDidResolve(LocationCandidate),

    /// Result: geocoding failed or found nothing
    SearchDidError(DashError),

    // ===== Suggest category =====
    /// Result: suggestions for `query`
    SuggestDidLoad {
        query: String,
        results: Vec<LocationCandidate>,
    },

    /// Result: suggestion lookup failed (list left as is)
    SuggestDidError(String),

    /// Move the highlight down
    SuggestNext,

    /// Move the highlight up
    SuggestPrev,

    /// Commit the suggestion at this index
    SuggestConfirm(usize),

    // ===== Geo category =====
    /// Use the device location
    GeoLocate,

    /// Result: device coordinates
    GeoDidResolve(Coordinates),

    /// Result: location unavailable
    GeoDidError(DashError),

    // ===== Weather category =====
    /// Refresh the snapshot for the current place
    WeatherFetch,

    /// Result: complete snapshot
    WeatherDidLoad(WeatherSnapshot),

    /// Result: fetch failed
    WeatherDidError(DashError),

    // ===== UI category =====
    UiToggleExpanded,

    UiToggleDark,

    UiCycleLanguage,

    /// Force a re-render (for cursor movement, etc.)
    Render,

    // ===== Uncategorized (global) =====
    /// Spinner tick
    Tick,

    /// Exit the application
    Quit,
}
