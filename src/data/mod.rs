//! Weather data sources.
//!
//! Defines the `WeatherSource` trait the dataset builder pulls readings
//! through, and the Tomorrow.io implementation used in production.

pub mod tomorrow;

use async_trait::async_trait;

use crate::types::WeatherReading;

/// Current conditions plus the hourly forecast for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationWeather {
    pub current: WeatherReading,
    /// Hourly forecast in API order (nearest hour first).
    pub forecast_hourly: Vec<WeatherReading>,
}

/// Abstraction over external weather APIs.
///
/// Failures are reported as `None`: a location that cannot be fetched is
/// skipped by the caller, never fatal to the run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current and forecast readings for a coordinate.
    async fn fetch(&self, latitude: f64, longitude: f64) -> Option<LocationWeather>;
}
