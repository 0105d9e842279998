use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::quantity::Quantity;

/// Band of values considered ideal for maturing whiskey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalRange {
    pub optimal_min: f64,
    pub optimal_max: f64,
}

impl OptimalRange {
    pub fn new(optimal_min: f64, optimal_max: f64) -> Self {
        Self {
            optimal_min,
            optimal_max,
        }
    }
}

/// Earliest and latest dates a report may cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateLimits {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportReading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportResult {
    pub quantity: Quantity,
    pub average: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub readings: Vec<ReportReading>,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub data_source: String,
}
