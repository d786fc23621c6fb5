pub mod fake_city;
pub mod fake_forecast;
pub mod location;

pub use fake_city::FakeCityProvider;
pub use fake_forecast::FakeForecastProvider;
pub use location::ConfiguredLocation;

use crate::error::Result;
use crate::models::Forecast;
use async_trait::async_trait;

/// Source of known city names
#[async_trait]
pub trait CityProvider: Send + Sync {
    /// Known cities in insertion order, optionally narrowed to names
    /// containing `filter` (case-insensitive). A blank filter lists all.
    async fn list_cities(&self, filter: Option<&str>) -> Result<Vec<String>>;

    async fn default_city(&self) -> Result<String>;

    /// Registers a city. Adding an already known city is a no-op.
    async fn add_city(&self, name: &str) -> Result<()>;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn get_forecast(&self, city: &str) -> Result<Forecast>;
}

/// Device location resolved to a city name
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// `Ok(Some(city))` when a fix was geocoded, `Ok(None)` when location
    /// services answered without a fix, `Err` when they are unavailable.
    async fn locate(&self) -> Result<Option<String>>;
}
