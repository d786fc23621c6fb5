use super::CityProvider;
use crate::error::{Result, SkyViewError};
use async_trait::async_trait;
use tokio::sync::RwLock;

const DEFAULT_CITY: &str = "San Francisco";

const KNOWN_CITIES: &[&str] = &[
    "London",
    "New York",
    "Paris",
    "Moscow",
    "Tokyo",
    "Dubai",
    "Singapore",
    "Barcelona",
    "Los Angeles",
    "San Francisco",
    "Madrid",
    "Rome",
    "Chicago",
    "Toronto",
    "Abu Dhabi",
    "St. Petersburg",
    "Amsterdam",
    "Berlin",
    "Prague",
    "Lisbon",
    "Washington",
    "Istanbul",
    "Las Vegas",
    "Seoul",
    "Sydney",
    "Miami",
    "Munich",
    "Milan",
    "San Diego",
    "Bangkok",
    "Vienna",
    "Dublin",
    "Vancouver",
    "Boston",
    "Zurich",
    "Budapest",
    "Houston",
    "Seattle",
    "Montreal",
    "Hong Kong",
    "Frankfurt",
    "São Paulo",
    "Copenhagen",
    "Atlanta",
    "Buenos Aires",
];

/// In-memory city list seeded with popular destinations
pub struct FakeCityProvider {
    cities: RwLock<Vec<String>>,
    default_city: String,
}

impl FakeCityProvider {
    pub fn new() -> Self {
        Self::with_cities(KNOWN_CITIES.iter().map(|c| c.to_string()), DEFAULT_CITY)
    }

    pub fn with_cities<I>(cities: I, default_city: &str) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for city in cities {
            if !unique.contains(&city) {
                unique.push(city);
            }
        }
        Self {
            cities: RwLock::new(unique),
            default_city: default_city.to_string(),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.cities.read().await.len()
    }
}

impl Default for FakeCityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CityProvider for FakeCityProvider {
    async fn list_cities(&self, filter: Option<&str>) -> Result<Vec<String>> {
        let cities = self.cities.read().await;
        let needle = filter.map(str::trim).filter(|f| !f.is_empty());

        let matches = match needle {
            Some(needle) => {
                let needle = needle.to_lowercase();
                cities
                    .iter()
                    .filter(|c| c.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
            None => cities.clone(),
        };

        Ok(matches)
    }

    async fn default_city(&self) -> Result<String> {
        Ok(self.default_city.clone())
    }

    async fn add_city(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SkyViewError::CityNotFound("empty city name".into()));
        }

        let mut cities = self.cities.write().await;
        if !cities.iter().any(|c| c == name) {
            tracing::debug!("Registering new city {}", name);
            cities.push(name.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_all_cities_in_insertion_order() {
        let provider = FakeCityProvider::new();
        let all = provider.list_cities(None).await.unwrap();
        assert_eq!(all.len(), KNOWN_CITIES.len());
        assert_eq!(all.first().map(String::as_str), Some("London"));
        assert_eq!(all.last().map(String::as_str), Some("Buenos Aires"));

        let blank = provider.list_cities(Some("   ")).await.unwrap();
        assert_eq!(blank, all);
    }

    #[tokio::test]
    async fn filter_is_case_insensitive_substring() {
        let provider = FakeCityProvider::new();
        let matches = provider.list_cities(Some("san")).await.unwrap();
        assert_eq!(matches, vec!["San Francisco", "San Diego"]);

        let matches = provider.list_cities(Some("LON")).await.unwrap();
        assert_eq!(matches, vec!["London", "Barcelona"]);

        assert!(provider.list_cities(Some("Atlantis")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_city_is_idempotent() {
        let provider = FakeCityProvider::new();
        let before = provider.len().await;

        provider.add_city("Reykjavik").await.unwrap();
        provider.add_city("Reykjavik").await.unwrap();
        provider.add_city("Paris").await.unwrap();

        assert_eq!(provider.len().await, before + 1);
        let all = provider.list_cities(None).await.unwrap();
        assert_eq!(all.last().map(String::as_str), Some("Reykjavik"));
        assert_eq!(all.iter().filter(|c| *c == "Reykjavik").count(), 1);
    }

    #[tokio::test]
    async fn rejects_blank_city() {
        let provider = FakeCityProvider::new();
        assert!(matches!(
            provider.add_city("  ").await,
            Err(SkyViewError::CityNotFound(_))
        ));
    }

    #[tokio::test]
    async fn default_city() {
        let provider = FakeCityProvider::new();
        assert_eq!(provider.default_city().await.unwrap(), "San Francisco");
    }
}
