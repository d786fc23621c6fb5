use super::LocationProvider;
use crate::config::LocationConfig;
use crate::error::{Result, SkyViewError};
use async_trait::async_trait;

/// Stands in for device location services: answers with the city from
/// config, or with no fix when none is configured.
pub struct ConfiguredLocation {
    config: LocationConfig,
}

impl ConfiguredLocation {
    pub fn new(config: LocationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocation {
    async fn locate(&self) -> Result<Option<String>> {
        if !self.config.enabled {
            return Err(SkyViewError::LocationUnavailable(
                "location services are disabled".into(),
            ));
        }

        let city = self
            .config
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        match &city {
            Some(c) => tracing::info!("Location resolved to {}", c),
            None => tracing::info!("Location services returned no fix"),
        }

        Ok(city)
    }
}
