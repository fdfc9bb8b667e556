use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding, TextInput, TextInputProps,
    TextInputStyle, centered_rect, highlight_substring,
};

use super::Component;
use crate::action::Action;
use crate::i18n::Theme;
use crate::model::LocationCandidate;
use crate::state::MIN_SUGGEST_CHARS;

const PLACEHOLDER: &str = "Search for a location...";

pub struct SearchOverlay {
    input: TextInput,
    modal: Modal,
    was_open: bool,
}

pub struct SearchOverlayProps<'a> {
    pub query: &'a str,
    pub suggestions: &'a [LocationCandidate],
    pub selected: Option<usize>,
    pub is_focused: bool,
    pub theme: Theme,
    // Action constructors
    pub on_query_change: fn(String) -> Action,
    pub on_query_submit: fn(String) -> Action,
    pub on_confirm: fn(usize) -> Action,
}

impl Default for SearchOverlay {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            modal: Modal::new(),
            was_open: false,
        }
    }
}

impl SearchOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_open(&mut self, is_open: bool) {
        if is_open && !self.was_open {
            self.input = TextInput::new();
        }
        self.was_open = is_open;
    }

    fn suggestion_lines(props: &SearchOverlayProps<'_>) -> Vec<Line<'static>> {
        let base = Style::default().fg(props.theme.fg);
        let highlight = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        props
            .suggestions
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let mut line = highlight_substring(&candidate.label(), props.query.trim(), base, highlight);
                if let Some(region) = &candidate.state {
                    line.spans.push(Span::styled(
                        format!("  {}", region),
                        Style::default().fg(props.theme.muted),
                    ));
                }
                if props.selected == Some(index) {
                    line = line.patch_style(Style::default().add_modifier(Modifier::REVERSED));
                    line.spans.insert(0, Span::raw("› "));
                } else {
                    line.spans.insert(0, Span::raw("  "));
                }
                line
            })
            .collect()
    }
}

impl Component<Action> for SearchOverlay {
    type Props<'a> = SearchOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let EventKind::Key(key) = event else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Esc => return vec![Action::SearchClose],
            KeyCode::Enter => {
                // A highlighted suggestion wins; otherwise search the raw text
                return match props.selected {
                    Some(index) if index < props.suggestions.len() => {
                        vec![(props.on_confirm)(index)]
                    }
                    _ => vec![(props.on_query_submit)(props.query.to_string())],
                };
            }
            KeyCode::Down => return vec![Action::SuggestNext],
            KeyCode::Up => return vec![Action::SuggestPrev],
            _ => {}
        }

        // All other keys go to the input
        let input_props = TextInputProps {
            value: props.query,
            placeholder: PLACEHOLDER,
            is_focused: true,
            style: TextInputStyle {
                base: BaseStyle {
                    border: None,
                    padding: Padding::new(1, 0, 1, 0),
                    bg: None,
                    fg: None,
                },
                placeholder_style: None,
                cursor_style: None,
            },
            on_change: props.on_query_change,
            on_submit: props.on_query_submit,
            on_cursor_move: Some(|_| Action::Render),
        };
        self.input
            .handle_event(event, input_props)
            .into_iter()
            .collect()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if area.width < 20 || area.height < 8 {
            return;
        }

        let SearchOverlay { input, modal, .. } = self;
        let modal_area = centered_rect(60, 12, area);
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            let chunks = Layout::vertical([
                Constraint::Length(3), // Input
                Constraint::Min(1),    // Suggestions
            ])
            .split(content_area);

            let input_bg = if props.theme.bg == Color::Reset {
                Color::Rgb(50, 50, 60)
            } else {
                props.theme.border
            };
            let input_props = TextInputProps {
                value: props.query,
                placeholder: PLACEHOLDER,
                is_focused: props.is_focused,
                style: TextInputStyle {
                    base: BaseStyle {
                        border: None,
                        padding: Padding::all(1),
                        bg: Some(input_bg),
                        fg: None,
                    },
                    placeholder_style: None,
                    cursor_style: None,
                },
                on_change: props.on_query_change,
                on_submit: props.on_query_submit,
                on_cursor_move: Some(|_| Action::Render),
            };
            input.render(frame, chunks[0], input_props);

            let lines = if props.suggestions.is_empty() {
                let hint = if props.query.trim().chars().count() < MIN_SUGGEST_CHARS {
                    format!("Type {} or more letters for suggestions", MIN_SUGGEST_CHARS)
                } else {
                    "Enter to search".to_string()
                };
                vec![Line::from(Span::styled(hint, Style::default().fg(props.theme.muted)))]
            } else {
                Self::suggestion_lines(&props)
            };
            let list_area = chunks[1].inner(ratatui::layout::Margin::new(1, 1));
            frame.render_widget(Paragraph::new(lines), list_area);
        };

        modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: ModalStyle {
                    base: BaseStyle {
                        bg: Some(Color::Rgb(35, 35, 45)),
                        padding: Padding::default(),
                        border: None,
                        fg: None,
                    },
                    ..Default::default()
                },
                behavior: ModalBehavior::default(),
                on_close: || Action::SearchClose,
                render_content: &mut render_content,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::*;

    fn props<'a>(suggestions: &'a [LocationCandidate], selected: Option<usize>) -> SearchOverlayProps<'a> {
        SearchOverlayProps {
            query: "Par",
            suggestions,
            selected,
            is_focused: true,
            theme: Theme::LIGHT,
            on_query_change: Action::SearchInputChange,
            on_query_submit: Action::SearchSubmit,
            on_confirm: Action::SuggestConfirm,
        }
    }

    fn press(code: KeyCode) -> EventKind {
        EventKind::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn paris() -> Vec<LocationCandidate> {
        vec![LocationCandidate::new("Paris", "FR", Coordinates::new(48.85, 2.35))]
    }

    #[test]
    fn test_enter_without_selection_submits_text() {
        let mut overlay = SearchOverlay::new();
        let suggestions = paris();
        let actions: Vec<_> = overlay
            .handle_event(&press(KeyCode::Enter), props(&suggestions, None))
            .into_iter()
            .collect();
        actions.assert_first(Action::SearchSubmit("Par".into()));
    }

    #[test]
    fn test_enter_with_selection_confirms() {
        let mut overlay = SearchOverlay::new();
        let suggestions = paris();
        let actions: Vec<_> = overlay
            .handle_event(&press(KeyCode::Enter), props(&suggestions, Some(0)))
            .into_iter()
            .collect();
        actions.assert_first(Action::SuggestConfirm(0));
    }

    #[test]
    fn test_arrows_navigate() {
        let mut overlay = SearchOverlay::new();
        let suggestions = paris();
        let down: Vec<_> = overlay
            .handle_event(&press(KeyCode::Down), props(&suggestions, None))
            .into_iter()
            .collect();
        let up: Vec<_> = overlay
            .handle_event(&press(KeyCode::Up), props(&suggestions, None))
            .into_iter()
            .collect();
        down.assert_first(Action::SuggestNext);
        up.assert_first(Action::SuggestPrev);
    }

    #[test]
    fn test_esc_closes() {
        let mut overlay = SearchOverlay::new();
        let actions: Vec<_> = overlay
            .handle_event(&press(KeyCode::Esc), props(&[], None))
            .into_iter()
            .collect();
        actions.assert_first(Action::SearchClose);
    }

    #[test]
    fn test_render_lists_suggestions() {
        let mut render = RenderHarness::new(80, 24);
        let mut overlay = SearchOverlay::new();
        overlay.set_open(true);
        let suggestions = paris();

        let output = render.render_to_string_plain(|frame| {
            overlay.render(frame, frame.area(), props(&suggestions, Some(0)));
        });

        assert!(output.contains("Paris, FR"), "suggestion missing:\n{}", output);
    }
}
