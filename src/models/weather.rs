use serde::{Deserialize, Serialize};

/// Weather condition attached to daily and hourly forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Sunny,
    PartlyCloudy,
    Cloudy,
    Rainy,
    Thunderstorm,
    Snowy,
    Foggy,
    Windy,
}

impl Weather {
    #[cfg(test)]
    pub const ALL: [Weather; 8] = [
        Weather::Sunny,
        Weather::PartlyCloudy,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Thunderstorm,
        Weather::Snowy,
        Weather::Foggy,
        Weather::Windy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "Sunny",
            Weather::PartlyCloudy => "Partly cloudy",
            Weather::Cloudy => "Cloudy",
            Weather::Rainy => "Rainy",
            Weather::Thunderstorm => "Thunderstorm",
            Weather::Snowy => "Snowy",
            Weather::Foggy => "Foggy",
            Weather::Windy => "Windy",
        }
    }

    /// Animation asset shipped with the graphical clients
    pub fn animation(&self) -> &'static str {
        match self {
            Weather::Sunny => "animations/sunny.json",
            Weather::PartlyCloudy => "animations/partly_cloudy.json",
            Weather::Cloudy => "animations/cloudy.json",
            Weather::Rainy => "animations/rainy.json",
            Weather::Thunderstorm => "animations/thunderstorm.json",
            Weather::Snowy => "animations/snowy.json",
            Weather::Foggy => "animations/foggy.json",
            Weather::Windy => "animations/windy.json",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Weather::Sunny => "☀",
            Weather::PartlyCloudy => "⛅",
            Weather::Cloudy => "☁",
            Weather::Rainy => "🌧",
            Weather::Thunderstorm => "⛈",
            Weather::Snowy => "❄",
            Weather::Foggy => "🌫",
            Weather::Windy => "🌬",
        }
    }

    /// Two-frame terminal animation, advanced by the UI tick
    pub fn frames(&self) -> [&'static str; 2] {
        match self {
            Weather::Sunny => ["☀", "✺"],
            Weather::PartlyCloudy => ["⛅", "☁"],
            Weather::Cloudy => ["☁", "☁ "],
            Weather::Rainy => ["🌧", "☂"],
            Weather::Thunderstorm => ["⛈", "⚡"],
            Weather::Snowy => ["❄", "❅"],
            Weather::Foggy => ["🌫", "≋"],
            Weather::Windy => ["🌬", "〰"],
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            Weather::Sunny => Color::Yellow,
            Weather::PartlyCloudy => Color::LightYellow,
            Weather::Cloudy => Color::Gray,
            Weather::Rainy => Color::LightBlue,
            Weather::Thunderstorm => Color::Magenta,
            Weather::Snowy => Color::White,
            Weather::Foggy => Color::DarkGray,
            Weather::Windy => Color::Cyan,
        }
    }
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_condition_has_an_animation_asset() {
        for weather in Weather::ALL {
            assert!(weather.animation().starts_with("animations/"));
            assert!(weather.animation().ends_with(".json"));
        }
    }

    #[test]
    fn first_frame_is_the_symbol() {
        for weather in Weather::ALL {
            assert_eq!(weather.frames()[0], weather.symbol());
        }
    }
}
