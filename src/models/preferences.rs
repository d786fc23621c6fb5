use serde::{Deserialize, Serialize};

/// Which message or content the forecast view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingState {
    Idle,
    Loading,
    Running,
    LocationError,
}

impl OperatingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingState::Idle => "Idle",
            OperatingState::Loading => "Loading",
            OperatingState::Running => "Running",
            OperatingState::LocationError => "Location error",
        }
    }
}

impl std::fmt::Display for OperatingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentState {
    #[default]
    Simple,
    Detailed,
}

impl ContentState {
    pub fn toggled(self) -> Self {
        match self {
            ContentState::Simple => ContentState::Detailed,
            ContentState::Detailed => ContentState::Simple,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentState::Simple => "Simple",
            ContentState::Detailed => "Detailed",
        }
    }
}

/// Display unit. Forecast values are stored in Celsius and converted at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherUnit {
    #[default]
    Metric,
    Imperial,
}

impl WeatherUnit {
    pub fn toggled(self) -> Self {
        match self {
            WeatherUnit::Metric => WeatherUnit::Imperial,
            WeatherUnit::Imperial => WeatherUnit::Metric,
        }
    }

    pub fn convert(&self, celsius: i32) -> i32 {
        match self {
            WeatherUnit::Metric => celsius,
            WeatherUnit::Imperial => (celsius as f32 * (9.0 / 5.0) + 32.0).round() as i32,
        }
    }

    pub fn compressed_indication(&self) -> &'static str {
        "°"
    }

    pub fn normal_indication(&self) -> &'static str {
        match self {
            WeatherUnit::Metric => "°C",
            WeatherUnit::Imperial => "°F",
        }
    }

    /// Converted temperature with the unit suffix, e.g. `21°C`
    pub fn format(&self, celsius: i32) -> String {
        format!("{}{}", self.convert(celsius), self.normal_indication())
    }

    pub fn format_compressed(&self, celsius: i32) -> String {
        format!("{}{}", self.convert(celsius), self.compressed_indication())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherUnit::Metric => "Metric",
            WeatherUnit::Imperial => "Imperial",
        }
    }
}

impl std::fmt::Display for WeatherUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
