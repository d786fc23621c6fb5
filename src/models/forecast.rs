use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Weather;

/// Upper bounds of synthetic forecast values; also the normalisation
/// maxima for [`DailyForecast::weather_feel`].
pub const MAX_TEMPERATURE: i32 = 40;
pub const MAX_WIND_SPEED: u32 = 30;
pub const MAX_PRECIPITATION: u8 = 100;

pub const DAILY_TIMESTAMP_FORMAT: &str = "%a, %-d %b";
pub const HOURLY_TIMESTAMP_FORMAT: &str = "%H:%M";

/// Forecast for one city, soonest day first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub daily: Vec<DailyForecast>,
}

impl Forecast {
    pub fn first_daily(&self) -> Option<&DailyForecast> {
        self.daily.first()
    }

    pub fn position_of(&self, day: &DailyForecast) -> Option<usize> {
        self.daily.iter().position(|d| d.date == day.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub hourly: Vec<HourlyForecast>,
    /// Average temperature, °C
    pub temperature: i32,
    pub min_temperature: i32,
    pub max_temperature: i32,
    /// 0-100
    pub precipitation_probability: u8,
    /// km/h
    pub wind_speed: u32,
    pub weather: Weather,
}

impl DailyForecast {
    /// Colour derived from temperature, wind and precipitation, each as a
    /// `[0, 1]` share of its maximum (red, green, blue).
    pub fn weather_feel(&self) -> WeatherFeel {
        WeatherFeel {
            red: ratio(self.temperature as f32, MAX_TEMPERATURE as f32),
            green: ratio(self.wind_speed as f32, MAX_WIND_SPEED as f32),
            blue: ratio(
                self.precipitation_probability as f32,
                MAX_PRECIPITATION as f32,
            ),
        }
    }

    /// "Today", "Tomorrow" or a short date, relative to `today`
    pub fn label_relative_to(&self, today: NaiveDate) -> String {
        if self.date == today {
            "Today".to_string()
        } else if self.date == today + Duration::days(1) {
            "Tomorrow".to_string()
        } else {
            self.date.format(DAILY_TIMESTAMP_FORMAT).to_string()
        }
    }

    pub fn label(&self) -> String {
        self.label_relative_to(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub timestamp: NaiveDateTime,
    /// °C
    pub temperature: i32,
    pub weather: Weather,
}

impl HourlyForecast {
    pub fn label(&self) -> String {
        self.timestamp.format(HOURLY_TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherFeel {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl WeatherFeel {
    pub fn to_rgb(self) -> (u8, u8, u8) {
        (
            (self.red * 255.0).round() as u8,
            (self.green * 255.0).round() as u8,
            (self.blue * 255.0).round() as u8,
        )
    }
}

fn ratio(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0)
}
