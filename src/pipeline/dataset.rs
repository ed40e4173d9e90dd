//! Dataset assembly.
//!
//! Fetches every configured location concurrently, labels the current
//! reading and the first `forecast_hours` forecast readings, and flattens
//! them into one `Dataset`. Locations the source cannot serve are skipped.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::{Location, MAX_FORECAST_HOURS};
use crate::data::{LocationWeather, WeatherSource};
use crate::types::{Dataset, LabeledSample};

pub struct DatasetBuilder<'a> {
    source: &'a dyn WeatherSource,
    forecast_hours: usize,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(source: &'a dyn WeatherSource) -> Self {
        Self {
            source,
            forecast_hours: MAX_FORECAST_HOURS,
        }
    }

    /// Limit the forecast horizon taken per location (capped at 24).
    pub fn with_forecast_hours(mut self, hours: usize) -> Self {
        self.forecast_hours = hours.min(MAX_FORECAST_HOURS);
        self
    }

    /// Label one location's readings: current first, then forecast hours.
    pub fn samples_for(&self, weather: &LocationWeather) -> Vec<LabeledSample> {
        std::iter::once(weather.current)
            .chain(weather.forecast_hourly.iter().take(self.forecast_hours).copied())
            .map(LabeledSample::from_reading)
            .collect()
    }

    /// Fetch and label all locations. Sample order follows `locations`.
    pub async fn build(&self, locations: &[Location]) -> Dataset {
        let fetches = locations
            .iter()
            .map(|loc| self.source.fetch(loc.latitude, loc.longitude));
        let results = join_all(fetches).await;

        let mut dataset = Dataset::new();
        let mut skipped = 0usize;
        for (loc, result) in locations.iter().zip(results) {
            match result {
                Some(weather) => {
                    let samples = self.samples_for(&weather);
                    debug!(location = %loc.name, samples = samples.len(), "Location labeled");
                    for s in samples {
                        dataset.push(s);
                    }
                }
                None => {
                    skipped += 1;
                    warn!(
                        location = %loc.name,
                        latitude = loc.latitude,
                        longitude = loc.longitude,
                        "No weather data, location skipped"
                    );
                }
            }
        }

        info!(
            locations = locations.len(),
            skipped,
            samples = dataset.len(),
            classes = ?dataset.class_counts(),
            "Dataset built"
        );
        dataset
    }
}
