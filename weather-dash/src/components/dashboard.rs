use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Layout};
use ratatui::prelude::{Frame, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{Component, WeatherBody, WeatherBodyProps};
use crate::action::Action;
use crate::state::AppState;

pub const ERROR_ICON: &str = "\u{26a0}\u{fe0f}";

/// Props for Dashboard - read-only view of state
pub struct DashboardProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Search bar, weather body and status lines
#[derive(Default)]
pub struct Dashboard;

impl Component<Action> for Dashboard {
    type Props<'a> = DashboardProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('/') => Some(Action::SearchOpen),
                KeyCode::Char('g') => Some(Action::GeoLocate),
                KeyCode::Char('r') | KeyCode::F(5) => Some(Action::WeatherFetch),
                KeyCode::Char('e') => Some(Action::UiToggleExpanded),
                KeyCode::Char('d') => Some(Action::UiToggleDark),
                KeyCode::Char('l') => Some(Action::UiCycleLanguage),
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: DashboardProps<'_>) {
        let state = props.state;
        let theme = state.prefs.theme();
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), area);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Search bar
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        // Search bar: current location text + language
        let location = if state.display_text.is_empty() {
            Span::styled("Search for a location...", Style::default().fg(theme.muted))
        } else {
            Span::styled(state.display_text.clone(), Style::default().fg(theme.fg).bold())
        };
        let search_bar = Line::from(vec![
            Span::styled(" 🔍 ", Style::default().fg(theme.accent)),
            location,
            Span::styled(
                format!("   [{}]", state.prefs.language.name()),
                Style::default().fg(theme.muted),
            ),
        ]);
        frame.render_widget(Paragraph::new(search_bar), chunks[0]);

        let mut body = WeatherBody;
        body.render(frame, chunks[2], WeatherBodyProps { state });

        // Loading indicator / error for the latest request
        let status = if state.is_loading() {
            Line::from(Span::styled(
                format!(" {} Loading...", state.spinner_frame()),
                Style::default().fg(theme.accent),
            ))
        } else if let Some(error) = &state.error {
            Line::from(Span::styled(
                format!(" {} {}", ERROR_ICON, error),
                Style::default().fg(Color::Rgb(220, 96, 96)),
            ))
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(status), chunks[3]);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[4],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("/", "search"),
                    StatusBarHint::new("g", "my location"),
                    StatusBarHint::new("r", "refresh"),
                    StatusBarHint::new("e", "details"),
                    StatusBarHint::new("d", "theme"),
                    StatusBarHint::new("l", "language"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashError;
    use crate::model::{Coordinates, CurrentConditions, Place, WeatherSnapshot};
    use crate::state::Phase;
    use tui_dispatch::testing::*;

    fn actions_for(keys: &str, is_focused: bool) -> Vec<Action> {
        let mut component = Dashboard;
        let state = AppState::default();
        component
            .handle_event(
                &EventKind::Key(key(keys)),
                DashboardProps {
                    state: &state,
                    is_focused,
                },
            )
            .into_iter()
            .collect()
    }

    #[test]
    fn test_handle_event_keys() {
        actions_for("/", true).assert_first(Action::SearchOpen);
        actions_for("g", true).assert_first(Action::GeoLocate);
        actions_for("e", true).assert_first(Action::UiToggleExpanded);
        actions_for("d", true).assert_first(Action::UiToggleDark);
        actions_for("l", true).assert_first(Action::UiCycleLanguage);

        let actions = actions_for("r", true);
        actions.assert_count(1);
        actions.assert_first(Action::WeatherFetch);
    }

    #[test]
    fn test_handle_event_quit() {
        actions_for("q", true).assert_first(Action::Quit);
    }

    #[test]
    fn test_handle_event_unfocused_ignores() {
        actions_for("r", false).assert_empty();
    }

    fn render(state: &AppState) -> String {
        let mut render = RenderHarness::new(100, 30);
        let mut component = Dashboard;
        render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                DashboardProps {
                    state,
                    is_focused: true,
                },
            );
        })
    }

    #[test]
    fn test_render_loading() {
        let state = AppState {
            display_text: "London".into(),
            phase: Phase::Searching,
            ..Default::default()
        };
        let output = render(&state);
        assert!(output.contains("London"));
        assert!(output.contains("Loading..."));
    }

    #[test]
    fn test_render_error_without_snapshot() {
        let state = AppState {
            phase: Phase::Error,
            error: Some(DashError::LocationNotFound),
            ..Default::default()
        };
        assert!(render(&state).contains("Location not found"));
    }

    #[test]
    fn test_render_snapshot() {
        let state = AppState {
            display_text: "Paris, FR".into(),
            phase: Phase::Resolved,
            snapshot: Some(WeatherSnapshot {
                place: Place::new("Paris, FR", Coordinates::new(48.85, 2.35)),
                current: CurrentConditions {
                    temperature: 21.0,
                    humidity: 55.0,
                    description: "Clear sky".into(),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        let output = render(&state);
        assert!(output.contains("Clear sky"));
        assert!(output.contains("55%"));
        assert!(output.contains("English"));
    }
}
