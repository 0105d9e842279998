use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::domain::quantity::Quantity;
use crate::domain::reading::{Reading, sort_by_timestamp};
use crate::domain::report::{DateLimits, OptimalRange, ReportReading, ReportResult};
use crate::services::data_source::{SensorSource, SourceError};
use crate::services::simulator::round_to_tenth;
use crate::services::validation::ValidationError;

pub const MAX_REPORT_DAYS: i64 = 31;
pub const DEFAULT_REPORT_DAYS: u64 = 7;
/// How far back the live backend keeps history.
pub const API_HISTORY_MONTHS: u32 = 6;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("no readings found between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Aggregates the readings dated within `start_date..=end_date` into a
/// report for `quantity`.
pub fn build_report(
    readings: &[Reading],
    quantity: Quantity,
    start_date: NaiveDate,
    end_date: NaiveDate,
    optimal: OptimalRange,
    data_source: &str,
) -> Result<ReportResult, ReportError> {
    let mut in_range: Vec<Reading> = readings
        .iter()
        .filter(|reading| {
            let date = reading.timestamp.date_naive();
            date >= start_date && date <= end_date
        })
        .cloned()
        .collect();
    if in_range.is_empty() {
        return Err(ReportError::EmptyRange {
            start: start_date,
            end: end_date,
        });
    }
    sort_by_timestamp(&mut in_range);

    let projected: Vec<ReportReading> = in_range
        .iter()
        .map(|reading| ReportReading {
            timestamp: reading.timestamp,
            value: quantity.value_of(reading),
            date: reading.timestamp.format("%Y-%m-%d").to_string(),
            time: reading.timestamp.format("%H:%M:%S").to_string(),
        })
        .collect();

    let sum: f64 = projected.iter().map(|item| item.value).sum();
    let average = sum / projected.len() as f64;
    let min_value = projected
        .iter()
        .map(|item| item.value)
        .fold(f64::INFINITY, f64::min);
    let max_value = projected
        .iter()
        .map(|item| item.value)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(ReportResult {
        quantity,
        average: round_to_tenth(average),
        min_value: round_to_tenth(min_value),
        max_value: round_to_tenth(max_value),
        start_date,
        end_date,
        readings: projected,
        optimal_min: optimal.optimal_min,
        optimal_max: optimal.optimal_max,
        data_source: data_source.to_string(),
    })
}

/// Guards against report requests outside the available history or too
/// large to be useful.
pub fn validate_report_range(
    start: NaiveDate,
    end: NaiveDate,
    limits: &DateLimits,
) -> Result<(), ValidationError> {
    if start < limits.min_date {
        return Err(ValidationError::StartBeforeEarliest {
            start,
            earliest: limits.min_date,
        });
    }
    if end > limits.max_date {
        return Err(ValidationError::EndAfterLatest {
            end,
            latest: limits.max_date,
        });
    }
    if end < start {
        return Err(ValidationError::EndBeforeStart { start, end });
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_REPORT_DAYS {
        return Err(ValidationError::RangeTooLong {
            days,
            max_days: MAX_REPORT_DAYS,
        });
    }
    Ok(())
}

/// The week ending `today`, pulled inside `limits`.
pub fn default_report_range(limits: &DateLimits, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = today.min(limits.max_date);
    let start = end
        .checked_sub_days(chrono::Days::new(DEFAULT_REPORT_DAYS))
        .unwrap_or(end)
        .max(limits.min_date);
    (start, end)
}

/// History window offered by the live backend.
pub fn api_date_limits(today: NaiveDate) -> DateLimits {
    DateLimits {
        min_date: today
            .checked_sub_months(Months::new(API_HISTORY_MONTHS))
            .unwrap_or(today),
        max_date: today,
    }
}

/// First and last instant of a date range, in UTC.
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = start.and_time(NaiveTime::MIN).and_utc();
    let to = end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::milliseconds(1);
    (from, to)
}

/// Validates the requested window, fetches its readings and aggregates them.
pub async fn generate_report(
    source: &dyn SensorSource,
    quantity: Quantity,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<ReportResult, ReportError> {
    validate_report_range(start, end, &source.date_limits(today))?;
    let (from, to) = day_bounds(start, end);
    log::info!("Generating {quantity} report for {start}..={end} from {} data", source.kind());
    let readings = source.readings_between(from, to).await?;
    log::debug!("Fetched {} readings", readings.len());
    build_report(
        &readings,
        quantity,
        start,
        end,
        source.optimal_range(quantity),
        source.kind(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{on_date, reading_at};

    fn optimal() -> OptimalRange {
        OptimalRange::new(16.0, 22.0)
    }

    fn limits() -> DateLimits {
        DateLimits {
            min_date: on_date(2025, 4, 15),
            max_date: on_date(2025, 10, 18),
        }
    }

    #[test]
    fn build_report_over_a_week_of_daily_readings() {
        let values = [18.0, 19.0, 20.0, 21.0, 20.0, 19.0, 18.0];
        let readings: Vec<Reading> = values
            .iter()
            .enumerate()
            .map(|(i, value)| reading_at(i as u64 + 1, on_date(2025, 5, 1 + i as u32), 12, *value, 35.0))
            .collect();

        let report = build_report(
            &readings,
            Quantity::Temperature,
            on_date(2025, 5, 1),
            on_date(2025, 5, 7),
            optimal(),
            "mock",
        )
        .unwrap();

        assert_eq!(report.average, 19.3);
        assert_eq!(report.min_value, 18.0);
        assert_eq!(report.max_value, 21.0);
        assert_eq!(report.readings.len(), 7);
        assert_eq!(report.optimal_min, 16.0);
        assert_eq!(report.optimal_max, 22.0);
        assert_eq!(report.data_source, "mock");
    }

    #[test]
    fn build_report_single_reading_has_equal_statistics() {
        let readings = vec![reading_at(1, on_date(2025, 5, 1), 9, 19.7, 41.3)];
        let report = build_report(
            &readings,
            Quantity::Humidity,
            on_date(2025, 5, 1),
            on_date(2025, 5, 1),
            OptimalRange::new(25.0, 45.0),
            "api",
        )
        .unwrap();

        assert_eq!(report.average, 41.3);
        assert_eq!(report.min_value, 41.3);
        assert_eq!(report.max_value, 41.3);
    }

    #[test]
    fn build_report_rejects_empty_input() {
        let error = build_report(
            &[],
            Quantity::Temperature,
            on_date(2025, 5, 1),
            on_date(2025, 5, 2),
            optimal(),
            "mock",
        )
        .expect_err("expected empty range");
        assert!(matches!(error, ReportError::EmptyRange { .. }));
    }

    #[test]
    fn build_report_ignores_readings_outside_the_dates() {
        let readings = vec![
            reading_at(1, on_date(2025, 4, 30), 23, 30.0, 35.0),
            reading_at(2, on_date(2025, 5, 1), 0, 18.0, 35.0),
            reading_at(3, on_date(2025, 5, 2), 23, 20.0, 35.0),
            reading_at(4, on_date(2025, 5, 3), 0, 10.0, 35.0),
        ];
        let report = build_report(
            &readings,
            Quantity::Temperature,
            on_date(2025, 5, 1),
            on_date(2025, 5, 2),
            optimal(),
            "mock",
        )
        .unwrap();

        assert_eq!(report.readings.len(), 2);
        assert_eq!(report.average, 19.0);
        assert_eq!(report.min_value, 18.0);
        assert_eq!(report.max_value, 20.0);
    }

    #[test]
    fn build_report_sorts_readings_and_formats_date_and_time() {
        let readings = vec![
            reading_at(1, on_date(2025, 5, 2), 8, 20.0, 35.0),
            reading_at(2, on_date(2025, 5, 1), 17, 19.0, 35.0),
        ];
        let report = build_report(
            &readings,
            Quantity::Temperature,
            on_date(2025, 5, 1),
            on_date(2025, 5, 2),
            optimal(),
            "mock",
        )
        .unwrap();

        assert_eq!(report.readings[0].date, "2025-05-01");
        assert_eq!(report.readings[0].time, "17:00:00");
        assert_eq!(report.readings[1].date, "2025-05-02");
        assert_eq!(report.readings[1].value, 20.0);
    }

    #[test]
    fn validate_report_range_accepts_a_month() {
        assert!(validate_report_range(on_date(2025, 5, 1), on_date(2025, 5, 31), &limits()).is_ok());
    }

    #[test]
    fn validate_report_range_rejects_more_than_31_days() {
        assert_eq!(
            validate_report_range(on_date(2025, 5, 1), on_date(2025, 6, 1), &limits()),
            Err(ValidationError::RangeTooLong {
                days: 32,
                max_days: 31
            })
        );
    }

    #[test]
    fn validate_report_range_rejects_inverted_range() {
        assert!(matches!(
            validate_report_range(on_date(2025, 5, 2), on_date(2025, 5, 1), &limits()),
            Err(ValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn validate_report_range_enforces_limits() {
        assert!(matches!(
            validate_report_range(on_date(2025, 4, 14), on_date(2025, 4, 20), &limits()),
            Err(ValidationError::StartBeforeEarliest { .. })
        ));
        assert!(matches!(
            validate_report_range(on_date(2025, 10, 15), on_date(2025, 10, 19), &limits()),
            Err(ValidationError::EndAfterLatest { .. })
        ));
    }

    #[test]
    fn default_report_range_is_last_week_clamped() {
        assert_eq!(
            default_report_range(&limits(), on_date(2025, 6, 10)),
            (on_date(2025, 6, 3), on_date(2025, 6, 10))
        );
        assert_eq!(
            default_report_range(&limits(), on_date(2025, 4, 17)),
            (on_date(2025, 4, 15), on_date(2025, 4, 17))
        );
        assert_eq!(
            default_report_range(&limits(), on_date(2025, 12, 1)),
            (on_date(2025, 10, 11), on_date(2025, 10, 18))
        );
    }

    #[test]
    fn api_date_limits_span_six_months() {
        let limits = api_date_limits(on_date(2025, 10, 18));
        assert_eq!(limits.min_date, on_date(2025, 4, 18));
        assert_eq!(limits.max_date, on_date(2025, 10, 18));
    }

    #[test]
    fn day_bounds_cover_whole_days() {
        let (from, to) = day_bounds(on_date(2025, 5, 1), on_date(2025, 5, 2));
        assert_eq!(from.to_rfc3339(), "2025-05-01T00:00:00+00:00");
        assert_eq!(to.timestamp_millis() - from.timestamp_millis(), 2 * 86_400_000 - 1);
    }
}
