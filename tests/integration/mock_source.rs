//! Mock weather source for integration testing.
//!
//! Provides a deterministic `WeatherSource` implementation that
//! synthesises current and hourly readings per coordinate from a seeded
//! RNG. Individual coordinates can be forced to fail.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

use thunderwatch::config::Location;
use thunderwatch::data::{LocationWeather, WeatherSource};
use thunderwatch::types::WeatherReading;

/// Shape of the synthetic weather a mock produces.
#[derive(Debug, Clone, Copy)]
pub enum Climate {
    /// Broad spread over all three risk tiers.
    Mixed,
    /// Dry and still: every reading labels green.
    Calm,
}

pub struct MockSource {
    climate: Climate,
    forecast_hours: usize,
    /// Coordinates that return `None`.
    failing: Arc<Mutex<Vec<(f64, f64)>>>,
    calls: Arc<Mutex<Vec<(f64, f64)>>>,
}

impl MockSource {
    pub fn new(climate: Climate) -> Self {
        Self {
            climate,
            forecast_hours: 30,
            failing: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every fetch for this coordinate fail.
    pub fn fail_at(&self, latitude: f64, longitude: f64) {
        self.failing.lock().unwrap().push((latitude, longitude));
    }

    /// Coordinates fetched so far.
    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().unwrap().clone()
    }

    fn reading(&self, rng: &mut StdRng) -> WeatherReading {
        match self.climate {
            Climate::Mixed => WeatherReading::new(
                rng.gen_range(10.0..35.0),
                rng.gen_range(50.0..100.0),
                rng.gen_range(0.0..35.0),
                rng.gen_range(995.0..1030.0),
                rng.gen_range(0.0..8.0),
            ),
            Climate::Calm => WeatherReading::new(
                rng.gen_range(10.0..25.0),
                rng.gen_range(20.0..60.0),
                rng.gen_range(0.0..10.0),
                rng.gen_range(1010.0..1030.0),
                0.0,
            ),
        }
    }
}

#[async_trait]
impl WeatherSource for MockSource {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Option<LocationWeather> {
        self.calls.lock().unwrap().push((latitude, longitude));
        if self.failing.lock().unwrap().contains(&(latitude, longitude)) {
            return None;
        }

        let seed = latitude.to_bits() ^ longitude.to_bits().rotate_left(17);
        let mut rng = StdRng::seed_from_u64(seed);
        let current = self.reading(&mut rng);
        let forecast_hourly = (0..self.forecast_hours).map(|_| self.reading(&mut rng)).collect();
        Some(LocationWeather {
            current,
            forecast_hourly,
        })
    }
}

/// A grid of `n` distinct coordinates.
pub fn locations(n: usize) -> Vec<Location> {
    (0..n)
        .map(|i| {
            let lat = -60.0 + (i as f64) * 2.5;
            let lon = -170.0 + (i as f64) * 5.5;
            Location::new(&format!("grid-{i}"), lat, lon)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let source = MockSource::new(Climate::Mixed);
        let a = source.fetch(10.0, 20.0).await.unwrap();
        let b = source.fetch(10.0, 20.0).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.forecast_hourly.len(), 30);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let source = MockSource::new(Climate::Calm);
        source.fail_at(1.0, 2.0);
        assert!(source.fetch(1.0, 2.0).await.is_none());
        assert!(source.fetch(2.0, 1.0).await.is_some());
    }
}
