//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::DashError;
use crate::i18n::DisplayPrefs;
use crate::model::{LocationCandidate, WeatherSnapshot};

/// Suggestions are requested once the query reaches this many characters
pub const MIN_SUGGEST_CHARS: usize = 3;

/// Delay before a suggestion request fires
pub const SUGGEST_DEBOUNCE_MS: u64 = 300;

/// Spinner timing while a request is in flight
pub const SPINNER_TICK_MS: u64 = 80;
pub const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Dashboard lifecycle: Idle → Searching → Resolved | Error
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Phase {
    #[default]
    Idle,
    Searching,
    Resolved,
    Error,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    // --- Dashboard ---
    /// Location text shown in the search bar
    #[debug(section = "Dashboard", label = "Location")]
    pub display_text: String,

    #[debug(section = "Dashboard", label = "Phase", debug_fmt)]
    pub phase: Phase,

    /// Latest complete snapshot; kept when a later fetch fails
    #[debug(section = "Dashboard", label = "Snapshot", debug_fmt)]
    pub snapshot: Option<WeatherSnapshot>,

    #[debug(section = "Dashboard", label = "Error", debug_fmt)]
    pub error: Option<DashError>,

    /// A geocode or locate step is pending; weather results until then are stale
    #[debug(section = "Dashboard", label = "Resolving")]
    pub resolving: bool,

    /// Forecast and air-quality panels visible
    #[debug(section = "Display", label = "Expanded")]
    pub expanded: bool,

    #[debug(section = "Display", label = "Prefs", debug_fmt)]
    pub prefs: DisplayPrefs,

    // --- Animation internals (skipped) ---
    #[debug(skip)]
    pub tick_count: u32,

    // --- Search mode (skipped) ---
    /// Whether search overlay is open
    #[debug(skip)]
    pub search_mode: bool,

    /// Current search query
    #[debug(skip)]
    pub search_query: String,

    /// Suggestions for the current query
    #[debug(skip)]
    pub suggestions: Vec<LocationCandidate>,

    /// Highlighted suggestion; `None` means Enter searches the raw text
    #[debug(skip)]
    pub suggestion_selected: Option<usize>,
}

impl AppState {
    pub fn new(prefs: DisplayPrefs) -> Self {
        Self {
            display_text: String::new(),
            phase: Phase::Idle,
            snapshot: None,
            error: None,
            resolving: false,
            expanded: false,
            prefs,
            tick_count: 0,
            search_mode: false,
            search_query: String::new(),
            suggestions: Vec::new(),
            suggestion_selected: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Searching
    }

    /// Enter `Searching`: loading on, previous error cleared
    pub fn begin_search(&mut self) {
        self.phase = Phase::Searching;
        self.error = None;
        self.resolving = false;
        self.tick_count = 0;
    }

    /// Enter `Searching` with coordinates still to be resolved
    pub fn begin_resolve(&mut self) {
        self.begin_search();
        self.resolving = true;
    }

    /// Accept a geocode/locate result only for the pending cycle
    pub fn finish_resolve(&mut self) -> bool {
        if !self.is_loading() || !self.resolving {
            return false;
        }
        self.resolving = false;
        true
    }

    pub fn fail(&mut self, error: DashError) {
        self.phase = Phase::Error;
        self.error = Some(error);
        self.resolving = false;
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestion_selected = None;
    }

    pub fn spinner_frame(&self) -> &'static str {
        SPINNER[self.tick_count as usize % SPINNER.len()]
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DisplayPrefs::default())
    }
}
