use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::quantity::Quantity;
use crate::domain::reading::Reading;
use crate::domain::report::{DateLimits, OptimalRange};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("resource not found")]
    NotFound,
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Where sensor data comes from: the live backend or the simulator.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// `"api"` or `"mock"`, recorded on generated reports.
    fn kind(&self) -> &'static str;

    async fn current(&self, quantity: Quantity) -> Result<f64, SourceError>;

    /// The reading preceding the current one, if there is one.
    async fn previous(&self, quantity: Quantity) -> Result<Option<f64>, SourceError>;

    async fn day_average(&self, quantity: Quantity, date: NaiveDate) -> Result<f64, SourceError>;

    async fn average_between_days(
        &self,
        quantity: Quantity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, SourceError>;

    async fn readings_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>, SourceError>;

    fn optimal_range(&self, quantity: Quantity) -> OptimalRange;

    fn date_limits(&self, today: NaiveDate) -> DateLimits;
}
