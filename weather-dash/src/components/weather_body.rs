use artbox::integrations::ratatui::ArtBox;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::location_header::{HEADER_OVERHEAD, figlet_renderer, temperature_fill};
use super::{
    AirQualityPanel, AirQualityPanelProps, Component, ERROR_ICON, ForecastPanel,
    ForecastPanelProps, LocationHeader, LocationHeaderProps,
};
use crate::action::Action;
use crate::i18n::Theme;
use crate::model::{CurrentConditions, WeatherSnapshot};
use crate::state::{AppState, Phase};

pub struct WeatherBody;

pub struct WeatherBodyProps<'a> {
    pub state: &'a AppState,
}

/// FIGlet terminus is 6 rows tall
const HEADER_CAP: u16 = 6 + HEADER_OVERHEAD;
const CURRENT_ROWS: u16 = 7;

impl Component<Action> for WeatherBody {
    type Props<'a> = WeatherBodyProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let theme = state.prefs.theme();

        match WeatherView::from_state(state) {
            WeatherView::Ready(snapshot) => render_ready(frame, area, state, snapshot, theme),
            WeatherView::Error(message) => render_error(frame, area, &message, theme),
            WeatherView::Loading => render_message(
                frame,
                area,
                Line::from(Span::styled(
                    format!("{} Searching...", state.spinner_frame()),
                    Style::default().fg(theme.muted),
                )),
            ),
            WeatherView::Empty => render_message(
                frame,
                area,
                Line::from(vec![
                    Span::styled("Press ", Style::default().fg(theme.muted)),
                    Span::styled("/", Style::default().fg(theme.accent).bold()),
                    Span::styled(" to search or ", Style::default().fg(theme.muted)),
                    Span::styled("g", Style::default().fg(theme.accent).bold()),
                    Span::styled(" for your location", Style::default().fg(theme.muted)),
                ]),
            ),
        }
    }
}

fn render_ready(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    snapshot: &WeatherSnapshot,
    theme: Theme,
) {
    let panels = if state.expanded {
        Constraint::Min(9)
    } else {
        Constraint::Length(0)
    };
    let chunks = Layout::vertical([
        Constraint::Max(HEADER_CAP),
        Constraint::Length(1),
        Constraint::Length(CURRENT_ROWS),
        panels,
    ])
    .flex(Flex::Start)
    .split(area);

    let mut header = LocationHeader;
    header.render(
        frame,
        chunks[0],
        LocationHeaderProps {
            place: &snapshot.place,
            temperature: Some(snapshot.current.temperature),
            theme,
        },
    );

    render_current(frame, chunks[2], &snapshot.current, theme);

    if state.expanded {
        let cols = Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[3]);
        ForecastPanel.render(
            frame,
            cols[0],
            ForecastPanelProps {
                daily: &snapshot.daily,
                hourly: &snapshot.hourly,
                theme,
            },
        );
        AirQualityPanel.render(
            frame,
            cols[1],
            AirQualityPanelProps {
                reading: snapshot.air_quality.as_ref(),
                theme,
            },
        );
    }
}

/// Big temperature on the left, details on the right
fn render_current(frame: &mut Frame, area: Rect, current: &CurrentConditions, theme: Theme) {
    let cols = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let temp_text = format!("{:.1}°C", current.temperature);
    let renderer = figlet_renderer(temperature_fill(Some(current.temperature)));
    frame.render_widget(ArtBox::new(&renderer, &temp_text), cols[0]);

    let label = Style::default().fg(theme.muted);
    let value = Style::default().fg(theme.fg);
    let detail = |name: &str, text: String| {
        Line::from(vec![
            Span::styled(format!("{name:<14}"), label),
            Span::styled(text, value),
        ])
    };
    let lines = vec![
        Line::from(Span::styled(
            current.description.clone(),
            Style::default().fg(theme.accent).bold(),
        )),
        detail("Feels like", format!("{:.1}°C", current.feels_like)),
        detail("Humidity", format!("{:.0}%", current.humidity)),
        detail("Wind", format!("{:.1} m/s", current.wind_speed)),
        detail("Precipitation", format!("{:.1} mm", current.precipitation)),
        detail("Pressure", format!("{:.0} hPa", current.pressure)),
        detail("UV index", format!("{:.1}", current.uv_index)),
    ];
    frame.render_widget(Paragraph::new(lines), cols[1]);
}

fn render_message(frame: &mut Frame, area: Rect, line: Line<'_>) {
    let chunks = Layout::vertical([Constraint::Length(1)])
        .flex(Flex::Center)
        .split(area);
    frame.render_widget(Paragraph::new(line.centered()), chunks[0]);
}

fn render_error(frame: &mut Frame, area: Rect, error: &str, theme: Theme) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // icon
        Constraint::Length(1), // "Error"
        Constraint::Length(1), // message
        Constraint::Length(1), // blank
        Constraint::Length(1), // hint
    ])
    .flex(Flex::Center)
    .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(ERROR_ICON).centered()),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled("Error", Style::default().fg(Color::Red).bold())).centered()),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Rgb(200, 100, 100)),
            ))
            .centered(),
        ),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new(
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(theme.muted)),
                Span::styled("/", Style::default().fg(theme.accent).bold()),
                Span::styled(" to search again", Style::default().fg(theme.muted)),
            ])
            .centered(),
        ),
        chunks[4],
    );
}

// ============================================================================
// Helpers
// ============================================================================

enum WeatherView<'a> {
    Ready(&'a WeatherSnapshot),
    Error(String),
    Loading,
    Empty,
}

impl<'a> WeatherView<'a> {
    /// A snapshot, once loaded, stays on screen through later errors and refreshes
    fn from_state(state: &'a AppState) -> Self {
        match (&state.snapshot, state.phase, &state.error) {
            (Some(snapshot), _, _) => WeatherView::Ready(snapshot),
            (None, Phase::Error, Some(error)) => WeatherView::Error(error.to_string()),
            (None, Phase::Searching, _) => WeatherView::Loading,
            _ => WeatherView::Empty,
        }
    }
}
