//! Effects - side effects declared by the reducer

use crate::i18n::Language;
use crate::model::{Coordinates, Place};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Resolve free text to a location
    Geocode { query: String, lang: Language },
    /// Fetch a snapshot for a known place
    FetchWeather { place: Place, lang: Language },
    /// Fetch a snapshot for device coordinates, naming it by reverse lookup
    FetchWeatherHere { coords: Coordinates, lang: Language },
    /// Ask the device locator for coordinates
    Locate,
    /// Debounced suggestion lookup
    SuggestCities { query: String, lang: Language },
    /// Drop any pending suggestion lookup
    CancelSuggestions,
    /// Drop the in-flight search/locate/fetch cycle before a new one starts
    CancelFetch,
}
