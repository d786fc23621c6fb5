use crate::models::{ContentState, WeatherUnit};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Widget},
};

/// City search box with the unit and view-mode indicators
pub struct SearchBar<'a> {
    query: &'a str,
    focused: bool,
    unit: WeatherUnit,
    content: ContentState,
}

impl<'a> SearchBar<'a> {
    pub fn new(query: &'a str, unit: WeatherUnit, content: ContentState) -> Self {
        Self {
            query,
            focused: false,
            unit,
            content,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for SearchBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(Span::styled(" SkyView ", Theme::title()))
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(22)])
            .split(inner);

        let query_line = if self.focused {
            Line::from(vec![
                Span::styled("🔍 ", Theme::dim()),
                Span::raw(self.query),
                Span::styled(" ", Theme::selected()),
            ])
        } else if self.query.is_empty() {
            Line::from(vec![
                Span::styled("🔍 ", Theme::dim()),
                Span::styled("Press / to search for a city", Theme::dim()),
            ])
        } else {
            Line::from(vec![
                Span::styled("🔍 ", Theme::dim()),
                Span::styled(self.query, Theme::header()),
            ])
        };
        Paragraph::new(query_line).render(chunks[0], buf);

        let indicators = Line::from(vec![
            Span::styled(self.unit.normal_indication(), Theme::highlight()),
            Span::styled(" | ", Theme::dim()),
            Span::styled(self.content.as_str(), Theme::highlight()),
        ]);
        Paragraph::new(indicators)
            .alignment(ratatui::layout::Alignment::Right)
            .render(chunks[1], buf);
    }
}

/// Dropdown of matching cities under the search bar
pub struct SuggestionList<'a> {
    cities: &'a [String],
    selected: usize,
    max_items: usize,
}

impl<'a> SuggestionList<'a> {
    pub fn new(cities: &'a [String], selected: usize) -> Self {
        Self {
            cities,
            selected,
            max_items: 8,
        }
    }

    /// Rows needed to show the list, borders included
    pub fn height(&self) -> u16 {
        let rows = self.cities.len().clamp(1, self.max_items);
        rows as u16 + 2
    }
}

impl Widget for SuggestionList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused());
        let inner = block.inner(area);
        block.render(area, buf);

        if self.cities.is_empty() {
            Paragraph::new(Span::styled("No matching cities", Theme::dim())).render(inner, buf);
            return;
        }

        // Keep the highlighted entry visible
        let offset = self.selected.saturating_sub(self.max_items - 1);
        let items: Vec<ListItem> = self
            .cities
            .iter()
            .enumerate()
            .skip(offset)
            .take(self.max_items)
            .map(|(idx, city)| {
                let style = if idx == self.selected {
                    Theme::selected()
                } else {
                    Theme::normal()
                };
                ListItem::new(Line::from(Span::styled(city.as_str(), style)))
            })
            .collect();

        List::new(items).render(inner, buf);
    }
}
