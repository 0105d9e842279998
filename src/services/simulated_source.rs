use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::domain::quantity::Quantity;
use crate::domain::reading::Reading;
use crate::domain::report::{DateLimits, OptimalRange};
use crate::services::clock::Clock;
use crate::services::data_source::{SensorSource, SourceError};
use crate::services::simulator::EnvironmentSimulator;

/// Serves every sensor endpoint from the simulator, for use without hardware.
pub struct SimulatedSource {
    simulator: EnvironmentSimulator,
    clock: Arc<dyn Clock>,
}

impl SimulatedSource {
    pub fn new(simulator: EnvironmentSimulator, clock: Arc<dyn Clock>) -> Self {
        Self { simulator, clock }
    }
}

#[async_trait]
impl SensorSource for SimulatedSource {
    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn current(&self, quantity: Quantity) -> Result<f64, SourceError> {
        Ok(self.simulator.generate_value(quantity, self.clock.now(), true))
    }

    /// The simulated value one minute ago.
    async fn previous(&self, quantity: Quantity) -> Result<Option<f64>, SourceError> {
        let previous_minute = self.clock.now() - Duration::minutes(1);
        Ok(Some(self.simulator.generate_value(quantity, previous_minute, true)))
    }

    async fn day_average(&self, quantity: Quantity, date: NaiveDate) -> Result<f64, SourceError> {
        Ok(self.simulator.day_average(quantity, date))
    }

    async fn average_between_days(
        &self,
        quantity: Quantity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, SourceError> {
        Ok(self.simulator.average_between_days(quantity, start, end))
    }

    /// Simulated history never extends past the current instant.
    async fn readings_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>, SourceError> {
        let to = to.min(self.clock.now());
        Ok(self.simulator.readings_between(from, to).collect())
    }

    fn optimal_range(&self, quantity: Quantity) -> OptimalRange {
        self.simulator.config().profile(quantity).optimal_range()
    }

    fn date_limits(&self, today: NaiveDate) -> DateLimits {
        DateLimits {
            min_date: self.simulator.config().data_start,
            max_date: today,
        }
    }
}
