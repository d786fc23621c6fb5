use crate::models::{DailyForecast, Forecast, WeatherUnit};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

/// Every forecast day in one table, the selected day highlighted
pub struct DetailedScreen<'a> {
    forecast: &'a Forecast,
    selected: Option<&'a DailyForecast>,
    unit: WeatherUnit,
}

impl<'a> DetailedScreen<'a> {
    pub fn new(forecast: &'a Forecast, selected: Option<&'a DailyForecast>, unit: WeatherUnit) -> Self {
        Self {
            forecast,
            selected,
            unit,
        }
    }

    fn is_selected(&self, day: &DailyForecast) -> bool {
        match self.selected {
            Some(selected) => selected.date == day.date,
            None => self.forecast.first_daily().map(|d| d.date) == Some(day.date),
        }
    }
}

impl Widget for DetailedScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} - {} days ", self.forecast.city, self.forecast.daily.len()),
                Theme::title(),
            ))
            .borders(Borders::ALL)
            .border_style(Theme::border_focused());

        let header = Row::new(vec![
            Cell::from("Day"),
            Cell::from(""),
            Cell::from("Conditions"),
            Cell::from("Avg"),
            Cell::from("Low"),
            Cell::from("High"),
            Cell::from("Rain"),
            Cell::from("Wind"),
            Cell::from("Feel"),
        ])
        .style(Theme::header());

        let rows: Vec<Row> = self
            .forecast
            .daily
            .iter()
            .map(|day| {
                let temp = |celsius: i32| {
                    Cell::from(self.unit.format_compressed(celsius))
                        .style(Style::default().fg(Theme::temp_color(celsius)))
                };

                let row = Row::new(vec![
                    Cell::from(day.label()),
                    Cell::from(day.weather.symbol())
                        .style(Style::default().fg(day.weather.color())),
                    Cell::from(day.weather.as_str()),
                    temp(day.temperature),
                    temp(day.min_temperature),
                    temp(day.max_temperature),
                    Cell::from(format!("{}%", day.precipitation_probability)).style(
                        Style::default().fg(Theme::precipitation_color(day.precipitation_probability)),
                    ),
                    Cell::from(format!("{} km/h", day.wind_speed)),
                    Cell::from("■■■").style(Style::default().fg(Theme::feel_color(day))),
                ]);

                if self.is_selected(day) {
                    row.style(Theme::selected())
                } else {
                    row
                }
            })
            .collect();

        let widths = [
            Constraint::Length(12),
            Constraint::Length(3),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(5),
        ];

        Table::new(rows, widths)
            .header(header)
            .block(block)
            .render(area, buf);
    }
}
