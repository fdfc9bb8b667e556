use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::Component;
use crate::action::Action;
use crate::i18n::Theme;
use crate::model::{DailyPoint, HourlyPoint};

const BAR_WIDTH: usize = 14;
const RAIN: Color = Color::Rgb(90, 160, 230);

pub struct ForecastPanel;

pub struct ForecastPanelProps<'a> {
    pub daily: &'a [DailyPoint],
    pub hourly: &'a [HourlyPoint],
    pub theme: Theme,
}

impl Component<Action> for ForecastPanel {
    type Props<'a> = ForecastPanelProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let temps: Vec<f64> = props.daily.iter().map(|d| d.temperature).collect();
        let daily_lines: Vec<Line> = props
            .daily
            .iter()
            .map(|d| series_line(&d.day, d.temperature, d.precipitation, &temps, props.theme))
            .collect();
        frame.render_widget(
            Paragraph::new(daily_lines).block(panel_block("Daily", props.theme)),
            chunks[0],
        );

        // Only as many hours as fit
        let rows = chunks[1].height.saturating_sub(2) as usize;
        let temps: Vec<f64> = props.hourly.iter().map(|h| h.temperature).collect();
        let hourly_lines: Vec<Line> = props
            .hourly
            .iter()
            .take(rows)
            .map(|h| {
                series_line(
                    &format!("{}h", h.time),
                    h.temperature,
                    h.precipitation,
                    &temps,
                    props.theme,
                )
            })
            .collect();
        frame.render_widget(
            Paragraph::new(hourly_lines).block(panel_block("Hourly", props.theme)),
            chunks[1],
        );
    }
}

pub(crate) fn panel_block(title: &str, theme: Theme) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .style(Style::default().bg(theme.bg).fg(theme.fg))
        .border_style(Style::default().fg(theme.border))
}

/// Filled cells for `value` on a min..max scale
fn bar_cells(value: f64, values: &[f64]) -> usize {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0;
    }
    let span = max - min;
    let ratio = if span <= f64::EPSILON {
        1.0
    } else {
        (value - min) / span
    };
    // At least one cell so the coldest row is still visible
    ((ratio * (BAR_WIDTH - 1) as f64).round() as usize + 1).min(BAR_WIDTH)
}

fn temperature_color(t: f64) -> Color {
    match t {
        t if t < 0.0 => Color::Rgb(150, 200, 255),
        t if t < 15.0 => Color::Rgb(100, 180, 255),
        t if t < 25.0 => Color::Rgb(100, 200, 150),
        t if t < 35.0 => Color::Rgb(255, 180, 80),
        _ => Color::Rgb(255, 80, 70),
    }
}

fn series_line(
    label: &str,
    temperature: f64,
    precipitation: f64,
    temps: &[f64],
    theme: Theme,
) -> Line<'static> {
    let filled = bar_cells(temperature, temps);
    let bar_color = temperature_color(temperature);
    Line::from(vec![
        Span::styled(format!("{label:<4} "), Style::default().fg(theme.muted)),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(bar_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "░".repeat(BAR_WIDTH - filled),
            Style::default().fg(theme.muted),
        ),
        Span::styled(format!(" {temperature:>5.1}°C"), Style::default().fg(theme.fg)),
        Span::styled(format!("  {precipitation:>3.0}%"), Style::default().fg(RAIN)),
    ])
}
