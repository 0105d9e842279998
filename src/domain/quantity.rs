use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::reading::Reading;

/// A measured dimension of the warehouse climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Temperature,
    Humidity,
}

/// Storage keys under which one quantity's threshold settings live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdKeys {
    pub min: &'static str,
    pub max: &'static str,
    pub valid_until: &'static str,
}

impl Quantity {
    pub const ALL: [Quantity; 2] = [Quantity::Temperature, Quantity::Humidity];

    /// Path segment used by the sensor API.
    pub fn as_str(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quantity::Temperature => "Temperature",
            Quantity::Humidity => "Humidity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Temperature => "°C",
            Quantity::Humidity => "%",
        }
    }

    pub fn value_of(self, reading: &Reading) -> f64 {
        match self {
            Quantity::Temperature => reading.temperature,
            Quantity::Humidity => reading.humidity,
        }
    }

    pub fn format_value(self, value: f64) -> String {
        format!("{value:.1}{}", self.unit())
    }

    pub fn threshold_keys(self) -> ThresholdKeys {
        match self {
            Quantity::Temperature => ThresholdKeys {
                min: "minTemperature",
                max: "maxTemperature",
                valid_until: "temperatureValidUntil",
            },
            Quantity::Humidity => ThresholdKeys {
                min: "minHumidity",
                max: "maxHumidity",
                valid_until: "humidityValidUntil",
            },
        }
    }

    /// Thresholds applied when nothing (or nothing valid) is stored.
    pub fn default_thresholds(self) -> (f64, f64) {
        match self {
            Quantity::Temperature => (25.0, 35.0),
            Quantity::Humidity => (45.0, 75.0),
        }
    }

    /// Inclusive bounds a user-entered threshold must fall within.
    pub fn threshold_bounds(self) -> (f64, f64) {
        match self {
            Quantity::Temperature => (15.0, 50.0),
            Quantity::Humidity => (0.0, 100.0),
        }
    }

    /// Optimal band reported alongside live API data.
    pub fn api_optimal_range(self) -> (f64, f64) {
        match self {
            Quantity::Temperature => (16.0, 22.0),
            Quantity::Humidity => (25.0, 45.0),
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn value_of_selects_matching_field() {
        let reading = Reading {
            id: 1,
            timestamp: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            temperature: 19.4,
            humidity: 38.2,
            sensor_id: "1".to_string(),
        };
        assert_eq!(Quantity::Temperature.value_of(&reading), 19.4);
        assert_eq!(Quantity::Humidity.value_of(&reading), 38.2);
    }

    #[test]
    fn threshold_keys_are_distinct_per_quantity() {
        let temperature = Quantity::Temperature.threshold_keys();
        let humidity = Quantity::Humidity.threshold_keys();
        assert_eq!(temperature.min, "minTemperature");
        assert_eq!(humidity.valid_until, "humidityValidUntil");
        assert_ne!(temperature.max, humidity.max);
    }

    #[test]
    fn format_value_appends_unit() {
        assert_eq!(Quantity::Temperature.format_value(19.5), "19.5°C");
        assert_eq!(Quantity::Humidity.format_value(40.0), "40.0%");
    }
}
