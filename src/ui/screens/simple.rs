use crate::models::{DailyForecast, Forecast, WeatherUnit};
use crate::ui::components::{precipitation_gauge, temperature_gauge, wind_gauge};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// One day at a glance: conditions, gauges, hourly strip and a day picker
pub struct SimpleScreen<'a> {
    forecast: &'a Forecast,
    selected: Option<&'a DailyForecast>,
    unit: WeatherUnit,
    tick: u64,
}

impl<'a> SimpleScreen<'a> {
    pub fn new(
        forecast: &'a Forecast,
        selected: Option<&'a DailyForecast>,
        unit: WeatherUnit,
        tick: u64,
    ) -> Self {
        Self {
            forecast,
            selected,
            unit,
            tick,
        }
    }

    fn day(&self) -> Option<&'a DailyForecast> {
        self.selected.or_else(|| self.forecast.first_daily())
    }
}

impl Widget for SimpleScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // Conditions
                Constraint::Length(4), // Gauges
                Constraint::Min(4),    // Hourly
                Constraint::Length(3), // Days
            ])
            .split(area);

        let Some(day) = self.day() else {
            Paragraph::new(Span::styled("No forecast days available", Theme::dim()))
                .render(area, buf);
            return;
        };

        self.render_conditions(day, chunks[0], buf);
        self.render_gauges(day, chunks[1], buf);
        self.render_hourly(day, chunks[2], buf);
        self.render_days(day, chunks[3], buf);
    }
}

impl SimpleScreen<'_> {
    fn render_conditions(&self, day: &DailyForecast, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} - {} ", self.forecast.city, day.label()),
                Theme::title(),
            ))
            .borders(Borders::ALL)
            .border_style(Theme::border_focused());
        let inner = block.inner(area);
        block.render(area, buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(12), Constraint::Min(20)])
            .split(inner);

        let frames = day.weather.frames();
        let frame = frames[(self.tick / 5 % 2) as usize];
        let symbol_style = Style::default()
            .fg(day.weather.color())
            .add_modifier(Modifier::BOLD);
        let top = columns[0].height.saturating_sub(1) / 2;
        Paragraph::new(Line::from(Span::styled(frame, symbol_style)))
            .alignment(Alignment::Center)
            .render(
                Rect {
                    y: columns[0].y + top,
                    height: 1,
                    ..columns[0]
                },
                buf,
            );

        let temp_style = Style::default()
            .fg(Theme::temp_color(day.temperature))
            .add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(Span::styled(self.unit.format(day.temperature), temp_style)),
            Line::from(Span::styled(day.weather.as_str(), Theme::header())),
            Line::from(vec![
                Span::styled("Low ", Theme::dim()),
                Span::styled(
                    self.unit.format_compressed(day.min_temperature),
                    Style::default().fg(Theme::temp_color(day.min_temperature)),
                ),
                Span::styled("  High ", Theme::dim()),
                Span::styled(
                    self.unit.format_compressed(day.max_temperature),
                    Style::default().fg(Theme::temp_color(day.max_temperature)),
                ),
            ]),
            Line::from(vec![
                Span::styled("Feel ", Theme::dim()),
                Span::styled("■■■", Style::default().fg(Theme::feel_color(day))),
            ]),
        ];
        Paragraph::new(lines).render(columns[1], buf);
    }

    fn render_gauges(&self, day: &DailyForecast, area: Rect, buf: &mut Buffer) {
        let gauge_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(area);

        temperature_gauge("Average", Some(day.temperature), self.unit)
            .render(gauge_chunks[0], buf);
        precipitation_gauge("Precipitation", Some(day.precipitation_probability))
            .render(gauge_chunks[1], buf);
        wind_gauge("Wind", Some(day.wind_speed)).render(gauge_chunks[2], buf);
    }

    fn render_hourly(&self, day: &DailyForecast, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Hourly")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        if day.hourly.is_empty() {
            Paragraph::new(Span::styled("No hourly data", Theme::dim())).render(inner, buf);
            return;
        }

        const SLOT: u16 = 7;
        let slots = (inner.width / SLOT).max(1) as usize;
        let step = day.hourly.len().div_ceil(slots).max(1);

        let hours: Vec<_> = day.hourly.iter().step_by(step).take(slots).collect();
        let times: Vec<Span> = hours
            .iter()
            .map(|h| Span::styled(format!("{:<7}", h.label()), Theme::dim()))
            .collect();
        let symbols: Vec<Span> = hours
            .iter()
            .map(|h| {
                Span::styled(
                    format!("{:<6}", h.weather.symbol()),
                    Style::default().fg(h.weather.color()),
                )
            })
            .collect();
        let temps: Vec<Span> = hours
            .iter()
            .map(|h| {
                Span::styled(
                    format!("{:<7}", self.unit.format_compressed(h.temperature)),
                    Style::default().fg(Theme::temp_color(h.temperature)),
                )
            })
            .collect();

        Paragraph::new(vec![Line::from(times), Line::from(symbols), Line::from(temps)])
            .render(inner, buf);
    }

    fn render_days(&self, selected: &DailyForecast, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Days")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans = Vec::new();
        for day in &self.forecast.daily {
            let style = if day.date == selected.date {
                Theme::selected()
            } else {
                Theme::normal()
            };
            spans.push(Span::styled(
                format!(
                    " {} {} ",
                    day.date.format("%a"),
                    self.unit.format_compressed(day.temperature)
                ),
                style,
            ));
            spans.push(Span::raw(" "));
        }
        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}
