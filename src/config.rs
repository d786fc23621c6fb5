use crate::error::{Result, SkyViewError};
use crate::models::{ContentState, WeatherUnit};
use dialoguer::{Confirm, Input, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub location: LocationConfig,
    pub timings: TimingsConfig,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// City whose suggestions are fetched when a session starts
    pub seed_city: String,
    pub unit: WeatherUnit,
    pub content: ContentState,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed_city: "London".into(),
            unit: WeatherUnit::Metric,
            content: ContentState::Simple,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationConfig {
    pub enabled: bool,
    /// City reported as the device location. Unset means "no fix".
    pub city: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            city: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingsConfig {
    pub location_error_grace_ms: u64,
    pub location_fix_delay_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            location_error_grace_ms: 3000,
            location_fix_delay_ms: 2000,
            settle_delay_ms: 150,
        }
    }
}

impl TimingsConfig {
    pub fn location_error_grace(&self) -> Duration {
        Duration::from_millis(self.location_error_grace_ms)
    }

    pub fn location_fix_delay(&self) -> Duration {
        Duration::from_millis(self.location_fix_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub days: u32,
    /// Fixed seed for the synthetic forecast generator
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { days: 7, seed: None }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when none exists.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(SkyViewError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p
            }
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            tracing::info!(
                "No config at {:?}, using defaults. Run `skyview init` to create one.",
                config_path
            );
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SkyViewError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| SkyViewError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session.seed_city.trim().is_empty() {
            return Err(SkyViewError::Config("session.seed_city must not be empty".into()));
        }
        if self.forecast.days == 0 || self.forecast.days > 16 {
            return Err(SkyViewError::Config(format!(
                "forecast.days must be between 1 and 16, got {}",
                self.forecast.days
            )));
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("skyview").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Default path for writing new config files (~/.config/skyview/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SkyViewError::Config("Cannot determine config directory".into()))?
            .join("skyview");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up SkyView!");
        println!();

        println!("Session");
        let seed_city: String = Input::new()
            .with_prompt("  City to suggest on start")
            .default("London".into())
            .interact_text()
            .map_err(|e| SkyViewError::Config(format!("Input error: {}", e)))?;

        let units = [WeatherUnit::Metric, WeatherUnit::Imperial];
        let unit_idx = Select::new()
            .with_prompt("  Units")
            .items(&["Metric (°C)", "Imperial (°F)"])
            .default(0)
            .interact()
            .map_err(|e| SkyViewError::Config(format!("Input error: {}", e)))?;

        let contents = [ContentState::Simple, ContentState::Detailed];
        let content_idx = Select::new()
            .with_prompt("  Forecast view")
            .items(&["Simple", "Detailed"])
            .default(0)
            .interact()
            .map_err(|e| SkyViewError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Location (leave city blank to always search manually)");
        let enabled = Confirm::new()
            .with_prompt("  Enable location lookup")
            .default(true)
            .interact()
            .map_err(|e| SkyViewError::Config(format!("Input error: {}", e)))?;

        let city = if enabled {
            let city: String = Input::new()
                .with_prompt("  Current city")
                .default(String::new())
                .allow_empty(true)
                .interact_text()
                .map_err(|e| SkyViewError::Config(format!("Input error: {}", e)))?;
            Some(city).filter(|c| !c.trim().is_empty())
        } else {
            None
        };

        println!();

        let config = Config {
            session: SessionConfig {
                seed_city,
                unit: units[unit_idx],
                content: contents[content_idx],
            },
            location: LocationConfig { enabled, city },
            ..Config::default()
        };
        config.validate()?;

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| SkyViewError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# SkyView Configuration\n# Generated by `skyview init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return result;
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            // Unset variables become empty so optional fields parse as null
            let value = std::env::var(var_name).unwrap_or_default();
            result = result.replace(placeholder, &value);
        }

        result
    }

    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("SKYVIEW_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| SkyViewError::Config("Cannot determine data directory".into()))?
            .join("skyview");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("skyview.log"))
    }
}
