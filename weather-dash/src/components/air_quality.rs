use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use super::forecast::panel_block;
use crate::action::Action;
use crate::i18n::Theme;
use crate::model::{AirQuality, AqiCategory};

const METER_WIDTH: usize = 16;
/// Pollutant meters are scaled against this concentration (µg/m³)
const METER_SCALE: f64 = 100.0;

pub struct AirQualityPanel;

pub struct AirQualityPanelProps<'a> {
    pub reading: Option<&'a AirQuality>,
    pub theme: Theme,
}

pub fn category_color(category: AqiCategory) -> Color {
    match category {
        AqiCategory::Good => Color::Rgb(0, 228, 0),
        AqiCategory::Moderate => Color::Rgb(255, 255, 0),
        AqiCategory::UnhealthySensitive => Color::Rgb(255, 126, 0),
        AqiCategory::Unhealthy => Color::Rgb(255, 0, 0),
        AqiCategory::VeryUnhealthy => Color::Rgb(143, 63, 151),
        AqiCategory::Hazardous => Color::Rgb(126, 0, 35),
    }
}

fn meter_line(label: &str, value: f64, theme: Theme) -> Line<'static> {
    let ratio = (value / METER_SCALE).clamp(0.0, 1.0);
    let filled = ((ratio * METER_WIDTH as f64).round() as usize).min(METER_WIDTH);
    Line::from(vec![
        Span::styled(format!("{label:<6}"), Style::default().fg(theme.muted)),
        Span::styled("█".repeat(filled), Style::default().fg(theme.accent)),
        Span::styled(
            "░".repeat(METER_WIDTH - filled),
            Style::default().fg(theme.muted),
        ),
        Span::styled(format!(" {value:.1}"), Style::default().fg(theme.fg)),
    ])
}

impl Component<Action> for AirQualityPanel {
    type Props<'a> = AirQualityPanelProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let theme = props.theme;
        let lines = match props.reading {
            Some(reading) => {
                let category = reading.category();
                let mut lines = vec![
                    Line::from(vec![
                        Span::styled("AQI ", Style::default().fg(theme.muted)),
                        Span::styled(
                            reading.aqi.to_string(),
                            Style::default()
                                .fg(category_color(category))
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", category.label()),
                            Style::default().fg(category_color(category)),
                        ),
                    ]),
                    Line::default(),
                ];
                lines.extend(
                    reading
                        .pollutants()
                        .into_iter()
                        .map(|(label, value)| meter_line(label, value, theme)),
                );
                lines
            }
            None => vec![Line::from(Span::styled(
                "No air quality data",
                Style::default().fg(theme.muted),
            ))],
        };

        frame.render_widget(
            Paragraph::new(lines).block(panel_block("Air Quality", theme)),
            area,
        );
    }
}
