//! Tomorrow.io weather provider.
//!
//! Fetches realtime conditions and the hourly forecast for a coordinate
//! and maps them onto `WeatherReading`, filling absent fields with
//! neutral defaults.
//!
//! API: `https://api.tomorrow.io/v4/weather/{realtime,forecast}`
//! Auth: API key via `apikey` query param, resolved from the environment.
//! Rate limit: HTTP 429 on burst. Failed requests are retried with
//! exponential backoff.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{LocationWeather, WeatherSource};
use crate::config::MAX_FORECAST_HOURS;
use crate::types::{ThunderError, WeatherReading};

const SOURCE_NAME: &str = "tomorrow.io";

/// Sea-level pressure assumed when the API omits it.
pub const DEFAULT_PRESSURE_HPA: f64 = 1013.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for the Tomorrow.io client.
#[derive(Debug)]
pub struct WeatherApiConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub units: String,
    pub timeout: Duration,
    /// Extra attempts after a failed request.
    pub max_retries: u32,
    /// Wait before the first retry; doubled on each further one.
    pub retry_backoff: Duration,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValues {
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
    #[serde(default)]
    wind_speed: Option<f64>,
    #[serde(default)]
    pressure_sea_level: Option<f64>,
    #[serde(default)]
    precipitation_intensity: Option<f64>,
}

impl RawValues {
    fn into_reading(self) -> WeatherReading {
        WeatherReading {
            temperature: self.temperature.unwrap_or(0.0),
            humidity: self.humidity.unwrap_or(0.0),
            wind_speed: self.wind_speed.unwrap_or(0.0),
            pressure_sea_level: self.pressure_sea_level.unwrap_or(DEFAULT_PRESSURE_HPA),
            precipitation_intensity: self.precipitation_intensity.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RealtimeResponse {
    data: RealtimeData,
}

#[derive(Debug, Deserialize)]
struct RealtimeData {
    #[serde(default)]
    values: RawValues,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timelines: Timelines,
}

#[derive(Debug, Deserialize)]
struct Timelines {
    #[serde(default)]
    hourly: Vec<HourlyEntry>,
}

#[derive(Debug, Deserialize)]
struct HourlyEntry {
    #[serde(default)]
    values: RawValues,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TomorrowClient {
    http: Client,
    config: WeatherApiConfig,
}

impl TomorrowClient {
    pub fn new(config: WeatherApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent("THUNDERWATCH/0.1.0")
            .build()
            .context("Failed to build weather HTTP client")?;
        Ok(Self { http, config })
    }

    fn transport(message: impl Into<String>) -> ThunderError {
        ThunderError::Transport {
            source_name: SOURCE_NAME.to_string(),
            message: message.into(),
        }
    }

    /// GET `{base_url}/weather/{endpoint}` and decode the JSON body.
    ///
    /// Transport errors and non-2xx statuses (429 included) are retried
    /// with doubling waits; an undecodable body is not.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        latitude: f64,
        longitude: f64,
        extra: &[(&str, &str)],
    ) -> Result<T, ThunderError> {
        let url = format!(
            "{}/weather/{endpoint}",
            self.config.base_url.trim_end_matches('/')
        );
        let mut params: Vec<(&str, String)> = vec![
            ("location", format!("{latitude},{longitude}")),
            ("units", self.config.units.clone()),
            ("apikey", self.config.api_key.expose_secret().clone()),
        ];
        params.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));

        let mut attempt: u32 = 0;
        loop {
            let err = match self.http.get(&url).query(&params).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp.json::<T>().await.map_err(|e| {
                        Self::transport(format!("Failed to parse {endpoint} response: {e}"))
                    });
                }
                Ok(resp) => Self::transport(format!("{endpoint} returned {}", resp.status())),
                Err(e) => Self::transport(format!("{endpoint} request failed: {e}")),
            };

            if attempt >= self.config.max_retries {
                return Err(err);
            }
            let wait = self.config.retry_backoff * 2u32.saturating_pow(attempt);
            attempt += 1;
            warn!(
                endpoint,
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "Weather request failed, backing off"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Fetch realtime and forecast readings, surfacing the failure cause.
    pub async fn fetch_checked(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationWeather, ThunderError> {
        let realtime: RealtimeResponse = self
            .get_json("realtime", latitude, longitude, &[])
            .await?;
        let forecast: ForecastResponse = self
            .get_json("forecast", latitude, longitude, &[("timesteps", "1h")])
            .await?;

        let weather = LocationWeather {
            current: realtime.data.values.into_reading(),
            forecast_hourly: forecast
                .timelines
                .hourly
                .into_iter()
                .take(MAX_FORECAST_HOURS)
                .map(|h| h.values.into_reading())
                .collect(),
        };

        debug!(
            latitude,
            longitude,
            current = %weather.current,
            forecast_hours = weather.forecast_hourly.len(),
            "Weather fetched"
        );
        Ok(weather)
    }
}

#[async_trait]
impl WeatherSource for TomorrowClient {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Option<LocationWeather> {
        match self.fetch_checked(latitude, longitude).await {
            Ok(weather) => Some(weather),
            Err(e) => {
                warn!(latitude, longitude, error = %e, "Weather fetch failed, skipping location");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
