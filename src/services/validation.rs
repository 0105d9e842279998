use chrono::NaiveDate;
use thiserror::Error;

/// Malformed user input, reported back next to the offending field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {lower} and {upper}, got {value}")]
    ThresholdOutOfBounds {
        field: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[error("maximum ({max}) must be greater than minimum ({min})")]
    InvertedThresholds { min: f64, max: f64 },
    #[error("validity date {0} must be in the future")]
    ValidityDateNotInFuture(NaiveDate),
    #[error("start date {start} precedes the earliest available data ({earliest})")]
    StartBeforeEarliest { start: NaiveDate, earliest: NaiveDate },
    #[error("end date {end} is after the latest available data ({latest})")]
    EndAfterLatest { end: NaiveDate, latest: NaiveDate },
    #[error("end date {end} must not precede start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("reports may cover at most {max_days} days, requested {days}")]
    RangeTooLong { days: i64, max_days: i64 },
    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2025-05-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert_eq!(
            parse_date("1. 5. 2025"),
            Err(ValidationError::InvalidDate("1. 5. 2025".to_string()))
        );
    }
}
