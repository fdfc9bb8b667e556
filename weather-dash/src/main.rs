//! Weather dashboard TUI

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_components::centered_rect;
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};
use weather_dash::action::Action;
use weather_dash::api::{self, ProviderKind, WeatherProvider};
use weather_dash::components::{
    Component, Dashboard, DashboardProps, SearchOverlay, SearchOverlayProps,
};
use weather_dash::config::Config;
use weather_dash::effect::Effect;
use weather_dash::geolocation::Geolocator;
use weather_dash::i18n::{DisplayPrefs, Language};
use weather_dash::logging;
use weather_dash::reducer::reducer;
use weather_dash::state::{AppState, SPINNER_TICK_MS, SUGGEST_DEBOUNCE_MS};

/// Weather dashboard: current conditions, forecast and air quality
#[derive(Parser, Debug)]
#[command(name = "weather-dash")]
#[command(about = "A terminal weather dashboard with forecasts and air quality")]
struct Args {
    /// Location to search on startup
    #[arg(long, short)]
    city: Option<String>,

    /// Weather backend (default: openweathermap when a key is set, else open-meteo)
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Language for descriptions and place names
    #[arg(long, value_enum)]
    lang: Option<Language>,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,

    /// Refresh interval in seconds (minimum 1)
    #[arg(long, short, value_parser = clap::value_parser!(u64).range(1..))]
    refresh_interval: Option<u64>,

    /// Config file (default: <config dir>/weather-dash/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (default: <cache dir>/weather-dash/weather-dash.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

impl Args {
    /// CLI flags win over file and environment values
    fn apply(&self, config: &mut Config) {
        if let Some(city) = &self.city {
            config.city = Some(city.clone());
        }
        if let Some(provider) = self.provider {
            config.provider = Some(provider);
        }
        if let Some(lang) = self.lang {
            config.language = lang;
        }
        if self.dark {
            config.dark_mode = true;
        }
        if let Some(secs) = self.refresh_interval {
            config.refresh_interval_secs = Some(secs);
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
    }
}

/// Long-lived clients shared by effect tasks
#[derive(Debug)]
struct Services {
    provider: Arc<dyn WeatherProvider>,
    geolocator: Geolocator,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum DashComponentId {
    Dashboard,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum DashContext {
    Main,
    Search,
}

impl EventRoutingState<DashComponentId, DashContext> for AppState {
    fn focused(&self) -> Option<DashComponentId> {
        if self.search_mode {
            Some(DashComponentId::Search)
        } else {
            Some(DashComponentId::Dashboard)
        }
    }

    fn modal(&self) -> Option<DashComponentId> {
        if self.search_mode {
            Some(DashComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DashComponentId) -> DashContext {
        match id {
            DashComponentId::Dashboard => DashContext::Main,
            DashComponentId::Search => DashContext::Search,
        }
    }

    fn default_context(&self) -> DashContext {
        DashContext::Main
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).map_err(io::Error::other)?;
    args.apply(&mut config);

    let log_path = config.log_path();
    if let Err(e) = logging::init(&log_path) {
        eprintln!("Warning: could not open log file {}: {}", log_path.display(), e);
    }

    let http = api::http_client().map_err(io::Error::other)?;
    let provider = match api::build_provider(&config, http.clone()) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "Set OPENWEATHERMAP_API_KEY, or use --provider open-meteo (no key needed)."
            );
            return Err(io::Error::other(e));
        }
    };
    let services = Arc::new(Services {
        provider,
        geolocator: Geolocator::new(config.geolocation.clone(), http)
            .with_ip_api_url(&config.endpoints.ip_api),
    });

    let Args { debug: debug_args, .. } = args;
    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let prefs = DisplayPrefs {
        language: config.language,
        dark_mode: config.dark_mode,
    };
    let state = debug
        .load_state_or_else_async(move || async move { Ok::<AppState, io::Error>(AppState::new(prefs)) })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!(provider = %services.provider.kind(), city = ?config.city, "starting");
    let result = run_app(
        &mut terminal,
        &debug,
        store,
        &config,
        services,
        replay_actions,
    )
    .await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct DashUi {
    dashboard: Dashboard,
    search: SearchOverlay,
}

fn search_props(state: &AppState, is_focused: bool) -> SearchOverlayProps<'_> {
    SearchOverlayProps {
        query: &state.search_query,
        suggestions: &state.suggestions,
        selected: state.suggestion_selected,
        is_focused,
        theme: state.prefs.theme(),
        on_query_change: Action::SearchInputChange,
        on_query_submit: Action::SearchSubmit,
        on_confirm: Action::SuggestConfirm,
    }
}

impl DashUi {
    fn new() -> Self {
        Self {
            dashboard: Dashboard,
            search: SearchOverlay::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<DashComponentId>,
    ) {
        event_ctx.set_component_area(DashComponentId::Dashboard, area);

        let props = DashboardProps {
            state,
            is_focused: render_ctx.is_focused() && !state.search_mode,
        };
        self.dashboard.render(frame, area, props);

        self.search.set_open(state.search_mode);
        if state.search_mode {
            let modal_area = centered_rect(60, 12, area);
            event_ctx.set_component_area(DashComponentId::Search, modal_area);
            self.search
                .render(frame, area, search_props(state, render_ctx.is_focused()));
        } else {
            event_ctx
                .component_areas
                .remove(&DashComponentId::Search);
        }
    }

    fn handle_dashboard_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = DashboardProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .dashboard
            .handle_event(event, props)
            .into_iter()
            .collect();
        if actions.is_empty() {
            HandlerResponse::ignored()
        } else {
            HandlerResponse {
                actions,
                consumed: true,
                needs_render: false,
            }
        }
    }

    fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        self.search.set_open(state.search_mode);
        let actions: Vec<_> = self
            .search
            .handle_event(event, search_props(state, true))
            .into_iter()
            .collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    config: &Config,
    services: Arc<Services>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(DashUi::new()));
    let mut bus: EventBus<AppState, Action, DashComponentId, DashContext> = EventBus::new();
    let keybindings: Keybindings<DashContext> = Keybindings::new();

    let ui_dashboard = Rc::clone(&ui);
    bus.register(DashComponentId::Dashboard, move |event, state| {
        ui_dashboard
            .borrow_mut()
            .handle_dashboard_event(&event.kind, state)
    });

    let ui_search = Rc::clone(&ui);
    bus.register(DashComponentId::Search, move |event, state| {
        ui_search
            .borrow_mut()
            .handle_search_event(&event.kind, state)
    });

    // Re-render on terminal resize (no action needed, just redraw)
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        _ => HandlerResponse::ignored(),
    });

    let initial_action = config.city.clone().map(Action::SearchSubmit);
    let refresh_interval = config.refresh_interval_secs;

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            initial_action,
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );

                if let Some(secs) = refresh_interval {
                    runtime.subscriptions().interval(
                        "refresh",
                        Duration::from_secs(secs),
                        || Action::WeatherFetch,
                    );
                }
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, Arc::clone(&services)),
        )
        .await
}

/// Handle effects by spawning tasks.
///
/// Both fetch variants share the "weather" key so a newer request replaces
/// an in-flight one. `CancelFetch` always precedes the spawn of a new cycle.
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, services: Arc<Services>) {
    tracing::debug!(?effect, "effect");
    match effect {
        Effect::Geocode { query, lang } => {
            ctx.tasks().spawn(TaskKey::new("geocode"), async move {
                match api::geocode(services.provider.as_ref(), &query, lang).await {
                    Ok(candidate) => Action::SearchDidResolve(candidate),
                    Err(e) => Action::SearchDidError(e),
                }
            });
        }
        Effect::FetchWeather { place, lang } => {
            ctx.tasks().spawn(TaskKey::new("weather"), async move {
                match api::fetch_snapshot(services.provider.as_ref(), place, lang).await {
                    Ok(snapshot) => Action::WeatherDidLoad(snapshot),
                    Err(e) => Action::WeatherDidError(e),
                }
            });
        }
        Effect::FetchWeatherHere { coords, lang } => {
            ctx.tasks().spawn(TaskKey::new("weather"), async move {
                match api::fetch_snapshot_here(services.provider.as_ref(), coords, lang).await {
                    Ok(snapshot) => Action::WeatherDidLoad(snapshot),
                    Err(e) => Action::WeatherDidError(e),
                }
            });
        }
        Effect::Locate => {
            ctx.tasks().spawn(TaskKey::new("locate"), async move {
                match services.geolocator.locate().await {
                    Ok(coords) => Action::GeoDidResolve(coords),
                    Err(e) => Action::GeoDidError(e),
                }
            });
        }
        Effect::SuggestCities { query, lang } => {
            ctx.tasks().debounce(
                "suggest",
                Duration::from_millis(SUGGEST_DEBOUNCE_MS),
                async move {
                    match api::suggest(services.provider.as_ref(), &query, lang).await {
                        Ok(results) => Action::SuggestDidLoad { query, results },
                        Err(e) => {
                            tracing::warn!(error = %e, "suggestion lookup failed");
                            Action::SuggestDidError(e.to_string())
                        }
                    }
                },
            );
        }
        Effect::CancelSuggestions => {
            ctx.tasks().cancel(&TaskKey::new("suggest"));
        }
        Effect::CancelFetch => {
            for key in ["geocode", "locate", "weather"] {
                ctx.tasks().cancel(&TaskKey::new(key));
            }
        }
    }
}
