use crate::models::OperatingState;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Centered message for every operating state that has no forecast to show
pub struct StateMessage {
    state: OperatingState,
    tick: u64,
}

impl StateMessage {
    pub fn new(state: OperatingState, tick: u64) -> Self {
        Self { state, tick }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        match self.state {
            OperatingState::Idle => vec![
                Line::from(Span::styled("Search for a city", Theme::header())),
                Line::from(Span::styled(
                    "Press / to search or l to use your location",
                    Theme::dim(),
                )),
            ],
            OperatingState::Loading => {
                let frame = SPINNER[(self.tick as usize) % SPINNER.len()];
                vec![Line::from(vec![
                    Span::styled(frame, Theme::highlight()),
                    Span::styled(" Loading forecast...", Theme::normal()),
                ])]
            }
            OperatingState::LocationError => vec![
                Line::from(Span::styled("Couldn't get your location", Theme::error())),
                Line::from(Span::styled(
                    "Falling back to manual search in a moment",
                    Theme::dim(),
                )),
            ],
            OperatingState::Running => Vec::new(),
        }
    }
}

impl Widget for StateMessage {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.lines();
        let top_padding = inner.height.saturating_sub(lines.len() as u16) / 2;
        let text_area = Rect {
            y: inner.y + top_padding,
            height: inner.height - top_padding,
            ..inner
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(message: &StateMessage) -> String {
        message
            .lines()
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn spinner_advances_with_tick() {
        let first = text(&StateMessage::new(OperatingState::Loading, 0));
        let second = text(&StateMessage::new(OperatingState::Loading, 1));
        assert_ne!(first, second);
        assert_eq!(first, text(&StateMessage::new(OperatingState::Loading, 8)));
    }

    #[test]
    fn location_error_explains_fallback() {
        let message = text(&StateMessage::new(OperatingState::LocationError, 0));
        assert!(message.contains("Couldn't get your location"));
    }

    #[test]
    fn running_has_no_message() {
        assert!(StateMessage::new(OperatingState::Running, 0).lines().is_empty());
    }
}
