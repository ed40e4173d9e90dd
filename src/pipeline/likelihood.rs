//! Weighted-factor thunderstorm likelihood.
//!
//! A fixed heuristic score in [0, 1], independent of any trained model.
//! Reported next to the classifier's prediction for comparison.

use crate::types::WeatherReading;

/// Scores above this are treated as high likelihood.
pub const HIGH_LIKELIHOOD: f64 = 0.7;

const TEMPERATURE_WEIGHT: f64 = 0.3;
const HUMIDITY_WEIGHT: f64 = 0.25;
const WIND_WEIGHT: f64 = 0.15;
const PRESSURE_WEIGHT: f64 = 0.15;
const PRECIPITATION_WEIGHT: f64 = 0.15;

/// Combine five factors into one score:
///
/// | factor        | value                        | weight |
/// |---------------|------------------------------|--------|
/// | temperature   | `max(0, (t - 20) / 20)`      | 0.30   |
/// | humidity      | `h / 100`                    | 0.25   |
/// | wind speed    | `min(w / 10, 1)`             | 0.15   |
/// | pressure      | `max(0, (1015 - p) / 20)`    | 0.15   |
/// | precipitation | `min(r / 10, 1)`             | 0.15   |
///
/// The weighted sum is clamped to [0, 1].
pub fn thunderstorm_likelihood(reading: &WeatherReading) -> f64 {
    let temperature = ((reading.temperature - 20.0) / 20.0).max(0.0);
    let humidity = reading.humidity / 100.0;
    let wind = (reading.wind_speed / 10.0).min(1.0);
    let pressure = ((1015.0 - reading.pressure_sea_level) / 20.0).max(0.0);
    let precipitation = (reading.precipitation_intensity / 10.0).min(1.0);

    let score = temperature * TEMPERATURE_WEIGHT
        + humidity * HUMIDITY_WEIGHT
        + wind * WIND_WEIGHT
        + pressure * PRESSURE_WEIGHT
        + precipitation * PRECIPITATION_WEIGHT;
    score.clamp(0.0, 1.0)
}

pub fn is_high(likelihood: f64) -> bool {
    likelihood > HIGH_LIKELIHOOD
}
