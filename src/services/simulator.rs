//! Deterministic stand-in for the warehouse sensor hardware.
//!
//! Every value is a pure function of the minute an instant falls in, so the
//! same instant always yields the same reading, across runs and processes.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};

use crate::domain::quantity::Quantity;
use crate::domain::reading::Reading;
use crate::domain::report::OptimalRange;

/// Noise-free samples taken per day when averaging a day.
pub const DAY_AVERAGE_SAMPLES: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct QuantityProfile {
    pub baseline: f64,
    pub daily_variation: f64,
    pub hourly_variation: f64,
    pub seasonal_amplitude: f64,
    /// `1.0` peaks in the afternoon, `-1.0` bottoms out in the afternoon.
    pub diurnal_sign: f64,
    /// Per-quantity constant multiplied into the minute seed.
    pub noise_frequency: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
}

impl QuantityProfile {
    pub fn temperature() -> Self {
        Self {
            baseline: 19.5,
            daily_variation: 1.5,
            hourly_variation: 0.3,
            seasonal_amplitude: 0.7,
            diurnal_sign: 1.0,
            noise_frequency: 1.0,
            min_value: 16.0,
            max_value: 24.0,
            optimal_min: 16.0,
            optimal_max: 22.0,
        }
    }

    pub fn humidity() -> Self {
        Self {
            baseline: 35.0,
            daily_variation: 5.0,
            hourly_variation: 1.5,
            seasonal_amplitude: 3.0,
            diurnal_sign: -1.0,
            noise_frequency: 1.5,
            min_value: 25.0,
            max_value: 50.0,
            optimal_min: 25.0,
            optimal_max: 45.0,
        }
    }

    pub fn optimal_range(&self) -> OptimalRange {
        OptimalRange::new(self.optimal_min, self.optimal_max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub temperature: QuantityProfile,
    pub humidity: QuantityProfile,
    pub reading_frequency_minutes: u32,
    pub sensor_id: String,
    /// First day for which simulated history is offered.
    pub data_start: NaiveDate,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            temperature: QuantityProfile::temperature(),
            humidity: QuantityProfile::humidity(),
            reading_frequency_minutes: 30,
            sensor_id: "1".to_string(),
            data_start: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap_or_default(),
        }
    }
}

impl SimulatorConfig {
    pub fn profile(&self, quantity: Quantity) -> &QuantityProfile {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentSimulator {
    config: SimulatorConfig,
}

impl EnvironmentSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Value of `quantity` at `instant`, clamped to the profile's realistic
    /// range and rounded to one decimal.
    pub fn generate_value(&self, quantity: Quantity, instant: DateTime<Utc>, add_noise: bool) -> f64 {
        let profile = self.config.profile(quantity);
        let minute = minute_bucket(instant);

        let seasonal_factor = (instant.month0() as f64 / 12.0 * 2.0 * PI).sin();
        let mut value = profile.baseline + seasonal_factor * profile.seasonal_amplitude;

        let day_progress = (instant.hour() as f64 - 8.0) / 24.0;
        let daily_factor = (day_progress * 2.0 * PI).sin();
        value += daily_factor * profile.daily_variation * profile.diurnal_sign;

        if add_noise {
            let fraction = seeded_fraction(minute, profile.noise_frequency);
            value += (fraction - 0.5) * profile.hourly_variation;
        }

        round_to_tenth(value.clamp(profile.min_value, profile.max_value))
    }

    /// Mean of the noise-free samples taken every three hours of `date`.
    pub fn day_average(&self, quantity: Quantity, date: NaiveDate) -> f64 {
        let total: f64 = (0..DAY_AVERAGE_SAMPLES)
            .map(|i| {
                let hour = i * 24 / DAY_AVERAGE_SAMPLES;
                let instant = date
                    .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default())
                    .and_utc();
                self.generate_value(quantity, instant, false)
            })
            .sum();
        round_to_tenth(total / DAY_AVERAGE_SAMPLES as f64)
    }

    /// Mean of the per-day averages over `start..=end`.
    pub fn average_between_days(&self, quantity: Quantity, start: NaiveDate, end: NaiveDate) -> f64 {
        let mut total = 0.0;
        let mut days = 0u32;
        for date in start.iter_days().take_while(|date| *date <= end) {
            total += self.day_average(quantity, date);
            days += 1;
        }
        round_to_tenth(total / days.max(1) as f64)
    }

    /// Readings from `start` to `end` inclusive, one every `interval_minutes`.
    pub fn series(&self, start: DateTime<Utc>, end: DateTime<Utc>, interval_minutes: u32) -> ReadingSeries {
        ReadingSeries {
            simulator: self.clone(),
            next: start,
            end,
            step: Duration::minutes(i64::from(interval_minutes.max(1))),
            next_id: 1,
        }
    }

    /// Readings between two instants at the configured reading frequency.
    pub fn readings_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> ReadingSeries {
        self.series(from, to, self.config.reading_frequency_minutes)
    }

    pub fn reading_at(&self, id: u64, instant: DateTime<Utc>) -> Reading {
        Reading {
            id,
            timestamp: instant,
            temperature: self.generate_value(Quantity::Temperature, instant, true),
            humidity: self.generate_value(Quantity::Humidity, instant, true),
            sensor_id: self.config.sensor_id.clone(),
        }
    }
}

/// Lazy, finite run of simulated readings. Output depends only on the bounds
/// and cadence, so asking the simulator for the same series replays it.
#[derive(Debug, Clone)]
pub struct ReadingSeries {
    simulator: EnvironmentSimulator,
    next: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    next_id: u64,
}

impl Iterator for ReadingSeries {
    type Item = Reading;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.end {
            return None;
        }
        let reading = self.simulator.reading_at(self.next_id, self.next);
        self.next += self.step;
        self.next_id += 1;
        Some(reading)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.next > self.end {
            return (0, Some(0));
        }
        let remaining = ((self.end - self.next).num_minutes() / self.step.num_minutes()) as usize + 1;
        (remaining, Some(remaining))
    }
}

pub fn minute_bucket(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis().div_euclid(60_000)
}

fn seeded_fraction(seed: i64, frequency: f64) -> f64 {
    let pseudo_random = (seed as f64 * frequency).sin() * 10_000.0;
    pseudo_random - pseudo_random.floor()
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
