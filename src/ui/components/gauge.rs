use crate::models::{WeatherUnit, MAX_PRECIPITATION, MAX_TEMPERATURE, MAX_WIND_SPEED};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Boxed reading with a proportional bar underneath
pub struct GaugeWidget<'a> {
    title: &'a str,
    value: Option<f64>,
    label: Option<String>,
    unit: &'a str,
    min: f64,
    max: f64,
    thresholds: Vec<(f64, Color)>,
}

impl<'a> GaugeWidget<'a> {
    pub fn new(title: &'a str, value: Option<f64>, unit: &'a str) -> Self {
        Self {
            title,
            value,
            label: None,
            unit,
            min: 0.0,
            max: 100.0,
            thresholds: Vec::new(),
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn thresholds(mut self, thresholds: Vec<(f64, Color)>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Text shown instead of the raw value, e.g. a unit-converted reading
    pub fn label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    fn get_color(&self, value: f64) -> Color {
        for (threshold, color) in self.thresholds.iter().rev() {
            if value >= *threshold {
                return *color;
            }
        }
        Theme::FG
    }

    fn ratio(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Widget for GaugeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        match self.value {
            Some(value) => {
                let color = self.get_color(value);
                let text = match self.label {
                    Some(ref label) => label.clone(),
                    None => format!("{:.0}{}", value, self.unit),
                };

                Paragraph::new(Line::from(vec![Span::styled(
                    text,
                    Style::default().fg(color),
                )]))
                .render(inner, buf);

                if inner.height >= 2 {
                    let bar_area = Rect {
                        x: inner.x,
                        y: inner.y + 1,
                        width: inner.width,
                        height: 1,
                    };

                    let filled = (bar_area.width as f64 * self.ratio(value)) as u16;

                    for x in bar_area.x..bar_area.x + bar_area.width {
                        let ch = if x < bar_area.x + filled {
                            '█'
                        } else {
                            '░'
                        };
                        buf[(x, bar_area.y)].set_char(ch).set_fg(color);
                    }
                }
            }
            None => {
                Paragraph::new(Line::from(vec![Span::styled("N/A", Theme::dim())]))
                    .render(inner, buf);
            }
        }
    }
}

/// Gauge fed with Celsius, labelled in the display unit
pub fn temperature_gauge(title: &str, celsius: Option<i32>, unit: WeatherUnit) -> GaugeWidget<'_> {
    let gauge = GaugeWidget::new(title, celsius.map(f64::from), unit.normal_indication())
        .range(-10.0, MAX_TEMPERATURE as f64)
        .thresholds(vec![
            (-100.0, Theme::TEMP_FREEZING),
            (1.0, Theme::TEMP_COOL),
            (10.0, Theme::TEMP_MILD),
            (20.0, Theme::TEMP_WARM),
            (30.0, Theme::TEMP_HOT),
        ]);

    match celsius {
        Some(c) => gauge.label(unit.format(c)),
        None => gauge,
    }
}

pub fn precipitation_gauge(title: &str, probability: Option<u8>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, probability.map(f64::from), "%")
        .range(0.0, MAX_PRECIPITATION as f64)
        .thresholds(vec![
            (0.0, Theme::RAIN_LOW),
            (30.0, Theme::RAIN_LIKELY),
            (70.0, Theme::RAIN_CERTAIN),
        ])
}

pub fn wind_gauge(title: &str, speed: Option<u32>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, speed.map(f64::from), " km/h")
        .range(0.0, MAX_WIND_SPEED as f64)
        .thresholds(vec![
            (0.0, Theme::SUCCESS),
            (15.0, Theme::WARNING),
            (25.0, Theme::ERROR),
        ])
}
