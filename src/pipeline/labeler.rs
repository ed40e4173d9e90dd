//! Rule-based thunderstorm-risk labeling.
//!
//! The thresholds define ground truth for supervised training. Changing
//! any of them invalidates previously trained artifacts.

use crate::types::{LabeledSample, RiskLevel, WeatherReading};

/// Red tier: all three must be exceeded.
pub const RED_HUMIDITY: f64 = 80.0;
pub const RED_PRECIPITATION: f64 = 4.0;
pub const RED_WIND_SPEED: f64 = 20.0;

/// Yellow tier: all three must be exceeded.
pub const YELLOW_HUMIDITY: f64 = 70.0;
pub const YELLOW_PRECIPITATION: f64 = 2.0;
pub const YELLOW_WIND_SPEED: f64 = 15.0;

/// Map a reading to its risk tier. Red is checked first; comparisons are
/// strict, so a value sitting exactly on a threshold does not qualify.
pub fn label(reading: &WeatherReading) -> RiskLevel {
    let exceeds = |humidity: f64, precipitation: f64, wind: f64| {
        reading.humidity > humidity
            && reading.precipitation_intensity > precipitation
            && reading.wind_speed > wind
    };

    if exceeds(RED_HUMIDITY, RED_PRECIPITATION, RED_WIND_SPEED) {
        RiskLevel::Red
    } else if exceeds(YELLOW_HUMIDITY, YELLOW_PRECIPITATION, YELLOW_WIND_SPEED) {
        RiskLevel::Yellow
    } else {
        RiskLevel::Green
    }
}

impl LabeledSample {
    /// Label a reading with the fixed rule.
    pub fn from_reading(reading: WeatherReading) -> Self {
        Self {
            risk: label(&reading),
            reading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(humidity: f64, wind: f64, precipitation: f64) -> WeatherReading {
        WeatherReading::new(22.0, humidity, wind, 1010.0, precipitation)
    }

    #[test]
    fn test_red_regardless_of_other_fields() {
        for (temp, pressure) in [(-10.0, 950.0), (0.0, 1013.0), (45.0, 1050.0)] {
            let r = WeatherReading::new(temp, 81.0, 20.5, pressure, 4.1);
            assert_eq!(label(&r), RiskLevel::Red);
        }
        assert_eq!(label(&reading(100.0, 60.0, 50.0)), RiskLevel::Red);
    }

    #[test]
    fn test_yellow_band() {
        for h in [70.5, 75.0, 80.0] {
            for p in [2.1, 3.0, 4.0] {
                for w in [15.1, 18.0, 20.0] {
                    assert_eq!(label(&reading(h, w, p)), RiskLevel::Yellow, "h={h} p={p} w={w}");
                }
            }
        }
    }

    #[test]
    fn test_red_needs_all_three() {
        // Two of three red conditions still falls through to yellow.
        assert_eq!(label(&reading(90.0, 25.0, 3.0)), RiskLevel::Yellow);
        assert_eq!(label(&reading(90.0, 18.0, 6.0)), RiskLevel::Yellow);
        assert_eq!(label(&reading(75.0, 25.0, 6.0)), RiskLevel::Yellow);
    }

    #[test]
    fn test_exact_thresholds_are_not_exceeded() {
        assert_eq!(label(&reading(80.0, 20.5, 4.5)), RiskLevel::Yellow);
        assert_eq!(label(&reading(85.0, 20.0, 4.5)), RiskLevel::Yellow);
        assert_eq!(label(&reading(85.0, 20.5, 4.0)), RiskLevel::Yellow);
        assert_eq!(label(&reading(70.0, 16.0, 3.0)), RiskLevel::Green);
        assert_eq!(label(&reading(75.0, 15.0, 3.0)), RiskLevel::Green);
        assert_eq!(label(&reading(75.0, 16.0, 2.0)), RiskLevel::Green);
    }

    #[test]
    fn test_green_default() {
        assert_eq!(label(&reading(0.0, 0.0, 0.0)), RiskLevel::Green);
        assert_eq!(label(&reading(95.0, 40.0, 0.0)), RiskLevel::Green);
        assert_eq!(label(&reading(50.0, 30.0, 10.0)), RiskLevel::Green);
    }

    #[test]
    fn test_scenario_reading_is_green() {
        // Humidity 80 is not > 80; wind 15 is not > 15.
        let r = WeatherReading::new(25.0, 80.0, 15.0, 1015.0, 2.5);
        assert_eq!(label(&r), RiskLevel::Green);
    }

    #[test]
    fn test_label_is_idempotent() {
        let r = reading(78.0, 17.0, 2.5);
        assert_eq!(label(&r), label(&r));
    }

    #[test]
    fn test_from_reading_keeps_reading() {
        let r = reading(85.0, 25.0, 6.0);
        let s = LabeledSample::from_reading(r);
        assert_eq!(s.reading, r);
        assert_eq!(s.risk, RiskLevel::Red);
    }
}
