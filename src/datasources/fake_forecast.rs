use super::ForecastProvider;
use crate::error::{Result, SkyViewError};
use crate::models::{
    DailyForecast, Forecast, HourlyForecast, Weather, MAX_PRECIPITATION, MAX_TEMPERATURE,
    MAX_WIND_SPEED,
};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const MIN_TEMPERATURE: i32 = -5;
const HOURS_PER_DAY: u32 = 24;
/// Hour of the daily temperature peak
const PEAK_HOUR: f64 = 15.0;

/// Synthesises plausible forecasts. Values are stable per (seed, city) so
/// repeated lookups of the same city agree within a process.
pub struct FakeForecastProvider {
    days: u32,
    seed: u64,
    start_date: Option<NaiveDate>,
}

impl FakeForecastProvider {
    pub fn new(days: u32) -> Self {
        Self {
            days: days.max(1),
            seed: 0x5eed_cafe,
            start_date: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Pin the first forecast day instead of using today's date
    #[cfg(test)]
    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    fn rng_for(&self, city: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        city.to_lowercase().hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }

    fn generate(&self, city: &str) -> Forecast {
        let mut rng = self.rng_for(city);
        let start = self
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());

        let daily = (0..self.days)
            .map(|offset| {
                let date = start + Duration::days(offset as i64);
                generate_day(&mut rng, date)
            })
            .collect();

        Forecast {
            city: city.to_string(),
            daily,
        }
    }
}

impl Default for FakeForecastProvider {
    fn default() -> Self {
        Self::new(7)
    }
}

#[async_trait]
impl ForecastProvider for FakeForecastProvider {
    async fn get_forecast(&self, city: &str) -> Result<Forecast> {
        let city = city.trim();
        if city.is_empty() {
            return Err(SkyViewError::CityNotFound("empty city name".into()));
        }
        let forecast = self.generate(city);
        tracing::debug!(
            "Generated {}-day forecast for {}",
            forecast.daily.len(),
            city
        );
        Ok(forecast)
    }
}

fn generate_day(rng: &mut StdRng, date: NaiveDate) -> DailyForecast {
    let temperature = rng.random_range(MIN_TEMPERATURE..=MAX_TEMPERATURE - 5);
    let min_temperature = temperature - rng.random_range(1..=6);
    let max_temperature = (temperature + rng.random_range(1..=6)).min(MAX_TEMPERATURE);
    let precipitation_probability = rng.random_range(0..=MAX_PRECIPITATION);
    let wind_speed = rng.random_range(0..=MAX_WIND_SPEED);

    let weather = pick_weather(rng, temperature, precipitation_probability, wind_speed);

    let hourly = (0..HOURS_PER_DAY)
        .map(|hour| {
            let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
            // Cosine curve between min and max peaking mid-afternoon
            let phase = ((hour as f64 - PEAK_HOUR) / 24.0) * std::f64::consts::TAU;
            let share = (phase.cos() + 1.0) / 2.0;
            let span = (max_temperature - min_temperature) as f64;
            let hourly_weather = if rng.random_bool(0.15) {
                pick_weather(rng, temperature, precipitation_probability, wind_speed)
            } else {
                weather
            };

            HourlyForecast {
                timestamp: date.and_time(time),
                temperature: min_temperature + (span * share).round() as i32,
                weather: hourly_weather,
            }
        })
        .collect();

    DailyForecast {
        date,
        hourly,
        temperature,
        min_temperature,
        max_temperature,
        precipitation_probability,
        wind_speed,
        weather,
    }
}

fn pick_weather(rng: &mut StdRng, temperature: i32, precipitation: u8, wind_speed: u32) -> Weather {
    if precipitation > 70 {
        if temperature <= 0 {
            Weather::Snowy
        } else if wind_speed > 20 {
            Weather::Thunderstorm
        } else {
            Weather::Rainy
        }
    } else if precipitation > 40 {
        Weather::Cloudy
    } else if wind_speed > 22 {
        Weather::Windy
    } else {
        match rng.random_range(0..4) {
            0 => Weather::Foggy,
            1 => Weather::PartlyCloudy,
            _ => Weather::Sunny,
        }
    }
}
