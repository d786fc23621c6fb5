use crate::models::DailyForecast;
use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    // Base colors
    pub const FG: Color = Color::White;
    pub const DIM: Color = Color::DarkGray;
    pub const ACCENT: Color = Color::LightBlue;
    pub const HIGHLIGHT: Color = Color::Cyan;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    // Temperature colors, thresholds in °C
    pub const TEMP_FREEZING: Color = Color::LightBlue;
    pub const TEMP_COOL: Color = Color::Cyan;
    pub const TEMP_MILD: Color = Color::Green;
    pub const TEMP_WARM: Color = Color::Yellow;
    pub const TEMP_HOT: Color = Color::Red;

    pub const RAIN_LOW: Color = Color::Gray;
    pub const RAIN_LIKELY: Color = Color::LightBlue;
    pub const RAIN_CERTAIN: Color = Color::Blue;

    pub fn title() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default().fg(Self::FG).add_modifier(Modifier::BOLD)
    }

    pub fn normal() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Self::FG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::ERROR).add_modifier(Modifier::BOLD)
    }

    /// Colour for a temperature given in Celsius, whatever the display unit
    pub fn temp_color(celsius: i32) -> Color {
        if celsius <= 0 {
            Self::TEMP_FREEZING
        } else if celsius < 10 {
            Self::TEMP_COOL
        } else if celsius < 20 {
            Self::TEMP_MILD
        } else if celsius < 30 {
            Self::TEMP_WARM
        } else {
            Self::TEMP_HOT
        }
    }

    pub fn precipitation_color(probability: u8) -> Color {
        if probability < 30 {
            Self::RAIN_LOW
        } else if probability < 70 {
            Self::RAIN_LIKELY
        } else {
            Self::RAIN_CERTAIN
        }
    }

    pub fn feel_color(day: &DailyForecast) -> Color {
        let (r, g, b) = day.weather_feel().to_rgb();
        Color::Rgb(r, g, b)
    }

    pub fn nav_key() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_label() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT)
    }
}
