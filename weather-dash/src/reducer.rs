//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, MIN_SUGGEST_CHARS, Phase};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    let lang = state.prefs.language;
    match action {
        // ===== Search actions =====
        Action::SearchOpen => {
            state.search_mode = true;
            state.search_query.clear();
            state.clear_suggestions();
            DispatchResult::changed()
        }

        Action::SearchClose => {
            state.search_mode = false;
            state.search_query.clear();
            state.clear_suggestions();
            DispatchResult::changed_with(Effect::CancelSuggestions)
        }

        Action::SearchInputChange(query) => {
            state.search_query = query;
            state.suggestion_selected = None;
            if state.search_query.trim().chars().count() < MIN_SUGGEST_CHARS {
                state.suggestions.clear();
                DispatchResult::changed_with(Effect::CancelSuggestions)
            } else {
                DispatchResult::changed_with(Effect::SuggestCities {
                    query: state.search_query.trim().to_string(),
                    lang,
                })
            }
        }

        Action::SearchSubmit(query) => {
            let query = query.trim().to_string();
            if query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search_mode = false;
            state.search_query.clear();
            state.clear_suggestions();
            state.display_text = query.clone();
            state.begin_resolve();
            DispatchResult::changed_with_many(vec![
                Effect::CancelSuggestions,
                Effect::CancelFetch,
                Effect::Geocode { query, lang },
            ])
        }

        Action::SearchDidResolve(candidate) => {
            if !state.finish_resolve() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(Effect::FetchWeather {
                place: candidate.to_place(),
                lang,
            })
        }

        Action::SearchDidError(error) | Action::GeoDidError(error) => {
            state.fail(error);
            DispatchResult::changed()
        }

        // ===== Suggestion actions =====
        Action::SuggestDidLoad { query, results } => {
            // Only the response for the current text counts
            if !state.search_mode || query != state.search_query.trim() {
                return DispatchResult::unchanged();
            }
            state.suggestions = results;
            state.suggestion_selected = None;
            DispatchResult::changed()
        }

        Action::SuggestDidError(_) => DispatchResult::unchanged(),

        Action::SuggestNext => {
            let Some(last) = state.suggestions.len().checked_sub(1) else {
                return DispatchResult::unchanged();
            };
            let next = match state.suggestion_selected {
                None => 0,
                Some(index) => (index + 1).min(last),
            };
            select_suggestion(state, next)
        }

        Action::SuggestPrev => match state.suggestion_selected {
            Some(index) => select_suggestion(state, index.saturating_sub(1)),
            None => DispatchResult::unchanged(),
        },

        Action::SuggestConfirm(index) => {
            let Some(candidate) = state.suggestions.get(index).cloned() else {
                return DispatchResult::unchanged();
            };
            state.search_mode = false;
            state.search_query.clear();
            state.clear_suggestions();
            state.display_text = candidate.label();
            state.begin_search();
            DispatchResult::changed_with_many(vec![
                Effect::CancelSuggestions,
                Effect::CancelFetch,
                Effect::FetchWeather {
                    place: candidate.to_place(),
                    lang,
                },
            ])
        }

        // ===== Geolocation actions =====
        Action::GeoLocate => {
            state.begin_resolve();
            DispatchResult::changed_with_many(vec![Effect::CancelFetch, Effect::Locate])
        }

        Action::GeoDidResolve(coords) => {
            if !state.finish_resolve() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(Effect::FetchWeatherHere { coords, lang })
        }

        // ===== Weather actions =====
        Action::WeatherFetch => {
            let Some(place) = state.snapshot.as_ref().map(|s| s.place.clone()) else {
                return DispatchResult::unchanged();
            };
            if state.is_loading() {
                return DispatchResult::unchanged();
            }
            state.begin_search();
            DispatchResult::changed_with(Effect::FetchWeather { place, lang })
        }

        // A fetch from an earlier cycle must not end the pending one
        Action::WeatherDidLoad(_) | Action::WeatherDidError(_) if state.resolving => {
            DispatchResult::unchanged()
        }

        Action::WeatherDidLoad(snapshot) => {
            state.display_text = snapshot.place.label.clone();
            state.snapshot = Some(snapshot);
            state.phase = Phase::Resolved;
            state.error = None;
            state.expanded = true;
            DispatchResult::changed()
        }

        Action::WeatherDidError(error) => {
            state.fail(error);
            DispatchResult::changed()
        }

        // ===== UI actions =====
        Action::UiToggleExpanded => {
            state.expanded = !state.expanded;
            DispatchResult::changed()
        }

        Action::UiToggleDark => {
            state.prefs.dark_mode = !state.prefs.dark_mode;
            DispatchResult::changed()
        }

        Action::UiCycleLanguage => {
            state.prefs.language = state.prefs.language.next();
            DispatchResult::changed()
        }

        Action::Render => DispatchResult::changed(),

        // ===== Global actions =====
        Action::Tick => {
            if state.is_loading() {
                state.tick_count = state.tick_count.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn select_suggestion(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if state.suggestion_selected == Some(index) {
        DispatchResult::unchanged()
    } else {
        state.suggestion_selected = Some(index);
        DispatchResult::changed()
    }
}
