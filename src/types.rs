//! Shared types for the THUNDERWATCH pipeline.
//!
//! These types form the data model used across all modules: raw weather
//! readings, rule-derived labels, labeled datasets, prediction results and
//! the domain error enum.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

/// Number of features fed to the scaler and classifier.
pub const FEATURE_COUNT: usize = 5;

/// Feature order shared by training and prediction. The fitted scaler
/// records this list and prediction refuses artifacts that disagree.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "temperature",
    "humidity",
    "windSpeed",
    "pressure",
    "precipitation",
];

// ---------------------------------------------------------------------------
// Weather reading
// ---------------------------------------------------------------------------

/// A single weather observation (current or one forecast hour).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity, 0–100.
    pub humidity: f64,
    /// Wind speed (m/s in metric units), ≥ 0.
    pub wind_speed: f64,
    /// Sea-level pressure in hPa.
    pub pressure_sea_level: f64,
    /// Precipitation intensity in mm/h, ≥ 0.
    pub precipitation_intensity: f64,
}

impl WeatherReading {
    pub fn new(
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        pressure_sea_level: f64,
        precipitation_intensity: f64,
    ) -> Self {
        Self {
            temperature,
            humidity,
            wind_speed,
            pressure_sea_level,
            precipitation_intensity,
        }
    }

    /// Feature vector in `FEATURE_NAMES` order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.pressure_sea_level,
            self.precipitation_intensity,
        ]
    }
}

impl fmt::Display for WeatherReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}°C, {:.0}% humidity, {:.1} wind, {:.1} hPa, {:.1} mm/h",
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.pressure_sea_level,
            self.precipitation_intensity,
        )
    }
}

// ---------------------------------------------------------------------------
// Risk level
// ---------------------------------------------------------------------------

/// Ordinal thunderstorm-risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Green,
    Yellow,
    Red,
}

impl RiskLevel {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Green => "green",
            RiskLevel::Yellow => "yellow",
            RiskLevel::Red => "red",
        }
    }

    /// Fixed human-readable message for this tier.
    pub fn message(&self) -> &'static str {
        match self {
            RiskLevel::Green => "No significant thunderstorm risk detected.",
            RiskLevel::Yellow => "Moderate risk of thunderstorms. Stay weather-aware.",
            RiskLevel::Red => "High risk of severe thunderstorms. Take necessary precautions!",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Labeled samples
// ---------------------------------------------------------------------------

/// A weather reading with its rule-derived risk label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub reading: WeatherReading,
    pub risk: RiskLevel,
}

/// Ordered collection of labeled samples for one training run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<LabeledSample>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: LabeledSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples per risk level (only levels that occur).
    pub fn class_counts(&self) -> BTreeMap<RiskLevel, usize> {
        let mut counts = BTreeMap::new();
        for s in &self.samples {
            *counts.entry(s.risk).or_insert(0) += 1;
        }
        counts
    }
}

impl From<Vec<LabeledSample>> for Dataset {
    fn from(samples: Vec<LabeledSample>) -> Self {
        Self { samples }
    }
}

impl FromIterator<LabeledSample> for Dataset {
    fn from_iter<I: IntoIterator<Item = LabeledSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

/// Output of a single prediction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub risk_level: RiskLevel,
    /// Confidence of the predicted class in percent, one decimal.
    pub probability: f64,
    pub message: String,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(json) => write!(f, "{json}"),
            Err(_) => write!(f, "{} ({:.1}%): {}", self.risk_level, self.probability, self.message),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for THUNDERWATCH.
#[derive(Debug, thiserror::Error)]
pub enum ThunderError {
    #[error("Transport error ({source_name}): {message}")]
    Transport { source_name: String, message: String },

    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    #[error("Model/feature mismatch: {0}")]
    ModelMismatch(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
