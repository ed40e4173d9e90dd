//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the weather API key) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::tomorrow::WeatherApiConfig;
use crate::pipeline::trainer::TrainerConfig;
use crate::types::{ThunderError, WeatherReading};

/// Most forecast hours a single location may contribute.
pub const MAX_FORECAST_HOURS: usize = 24;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Reading scored after training. Falls back to a humid, breezy sample.
    #[serde(default)]
    pub prediction: Option<WeatherReading>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub units: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub forecast_hours: usize,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tomorrow.io/v4".to_string(),
            api_key_env: "TOMORROW_API_KEY".to_string(),
            units: "metric".to_string(),
            timeout_secs: 15,
            max_retries: 3,
            retry_backoff_ms: 1000,
            forecast_hours: MAX_FORECAST_HOURS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub model_dir: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            model_dir: PathBuf::from("models"),
        }
    }
}

/// A named coordinate to collect training data for.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ThunderError> {
        let t = &self.training;
        if !(t.test_fraction > 0.0 && t.test_fraction < 1.0) {
            return Err(ThunderError::Config(format!(
                "training.test_fraction must be in (0, 1), got {}",
                t.test_fraction
            )));
        }
        if t.n_trees == 0 {
            return Err(ThunderError::Config("training.n_trees must be at least 1".into()));
        }
        if t.min_samples_split < 2 {
            return Err(ThunderError::Config(
                "training.min_samples_split must be at least 2".into(),
            ));
        }
        if self.weather.forecast_hours > MAX_FORECAST_HOURS {
            return Err(ThunderError::Config(format!(
                "weather.forecast_hours must be at most {MAX_FORECAST_HOURS}, got {}",
                self.weather.forecast_hours
            )));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Build the weather client configuration, resolving the API key.
    pub fn weather_api(&self) -> Result<WeatherApiConfig> {
        let key = Self::resolve_env(&self.weather.api_key_env)?;
        Ok(WeatherApiConfig {
            base_url: self.weather.base_url.clone(),
            api_key: SecretString::new(key),
            units: self.weather.units.clone(),
            timeout: Duration::from_secs(self.weather.timeout_secs),
            max_retries: self.weather.max_retries,
            retry_backoff: Duration::from_millis(self.weather.retry_backoff_ms),
        })
    }

    /// Trainer settings derived from the `[training]` section.
    pub fn trainer(&self) -> TrainerConfig {
        let t = &self.training;
        TrainerConfig {
            test_fraction: t.test_fraction,
            seed: t.seed,
            n_trees: t.n_trees,
            max_depth: t.max_depth,
            min_samples_split: t.min_samples_split,
            model_dir: t.model_dir.clone(),
        }
    }

    /// The reading to score once a model is available.
    pub fn prediction_reading(&self) -> WeatherReading {
        self.prediction
            .unwrap_or_else(|| WeatherReading::new(25.0, 80.0, 15.0, 1015.0, 2.5))
    }
}
