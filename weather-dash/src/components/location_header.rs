use artbox::{
    Alignment as ArtAlignment, Color as ArtColor, Fill, LinearGradient, Renderer, fonts,
    integrations::ratatui::ArtBox,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::i18n::Theme;
use crate::model::Place;

pub struct LocationHeader;

pub struct LocationHeaderProps<'a> {
    pub place: &'a Place,
    pub temperature: Option<f64>,
    pub theme: Theme,
}

/// Rows inside the header area besides the FIGlet label: spacer + coordinates.
pub const HEADER_OVERHEAD: u16 = 2;

/// Gradient endpoints keyed on temperature (°C)
pub fn gradient_colors(temp: Option<f64>) -> (ArtColor, ArtColor) {
    match temp {
        Some(t) if t < 0.0 => (
            ArtColor::rgb(150, 200, 255), // Ice blue
            ArtColor::rgb(200, 230, 255), // Light ice
        ),
        Some(t) if t < 15.0 => (
            ArtColor::rgb(100, 180, 255), // Cool blue
            ArtColor::rgb(150, 220, 200), // Teal
        ),
        Some(t) if t < 25.0 => (
            ArtColor::rgb(100, 200, 150), // Green
            ArtColor::rgb(255, 220, 100), // Yellow
        ),
        Some(t) if t < 35.0 => (
            ArtColor::rgb(255, 180, 80), // Orange
            ArtColor::rgb(255, 120, 80), // Deep orange
        ),
        Some(_) => (
            ArtColor::rgb(255, 100, 80), // Red-orange
            ArtColor::rgb(255, 60, 60),  // Hot red
        ),
        None => (
            ArtColor::rgb(180, 180, 180), // Gray (no data)
            ArtColor::rgb(220, 220, 220),
        ),
    }
}

pub fn temperature_fill(temp: Option<f64>) -> Fill {
    let (start, end) = gradient_colors(temp);
    Fill::Linear(LinearGradient::horizontal(start, end))
}

/// FIGlet renderer shared by the header and the big temperature readout
pub fn figlet_renderer(fill: Fill) -> Renderer {
    Renderer::new(fonts::stack(&["terminus", "miniwi"]))
        .with_plain_fallback()
        .with_alignment(ArtAlignment::Center)
        .with_fill(fill)
}

impl Component<Action> for LocationHeader {
    type Props<'a> = LocationHeaderProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // FIGlet place name
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Coordinates
        ])
        .split(area);

        // "London, GB" -> "London" keeps the FIGlet line short
        let name = props
            .place
            .label
            .split(',')
            .next()
            .unwrap_or(&props.place.label)
            .trim();
        let renderer = figlet_renderer(temperature_fill(props.temperature));
        frame.render_widget(ArtBox::new(&renderer, name), chunks[0]);

        let coords_line = Line::from(vec![Span::styled(
            format!("{}  ·  {}", props.place.label, props.place.coords),
            Style::default().fg(props.theme.muted),
        )])
        .centered();
        frame.render_widget(Paragraph::new(coords_line), chunks[2]);
    }
}
