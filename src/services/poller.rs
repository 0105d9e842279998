//! Timer-driven refresh of dashboard state.
//!
//! Each periodic task awaits its own fetch before the next tick is taken, so
//! fetches never overlap. Cancelling the shared token stops the timers and
//! discards any fetch still in flight.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::domain::quantity::Quantity;
use crate::domain::thresholds::Thresholds;
use crate::services::data_source::{SensorSource, SourceError};
use crate::services::settings::ThresholdSettings;
use crate::services::trend::{RangeStatus, Trend, format_difference};

pub const DASHBOARD_REFRESH_SECS: u64 = 30;
pub const TOKEN_REFRESH_SECS: u64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: watch::Sender<bool>,
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self { sender, receiver }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `task` immediately and then every `period` until `token` is
/// cancelled. Returns the number of completed runs.
pub async fn run_periodic<F, Fut>(period: Duration, token: &CancellationToken, mut task: F) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut completed = 0;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                log::debug!("Periodic task cancelled mid-run, result dropped");
                break;
            }
            _ = task() => completed += 1,
        }
    }
    completed
}

/// Display state for one quantity, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub quantity: Quantity,
    pub current: f64,
    pub previous: Option<f64>,
    pub difference: Option<String>,
    pub trend: Option<Trend>,
    pub status: RangeStatus,
    pub thresholds: Thresholds,
    pub fetched_at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] crate::services::kv_store::StoreError),
}

pub async fn fetch_snapshot(
    source: &dyn SensorSource,
    settings: &ThresholdSettings,
    quantity: Quantity,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<DashboardSnapshot, SnapshotError> {
    let current = source.current(quantity).await?;
    let previous = source.previous(quantity).await?;
    let thresholds = settings.load(quantity, today)?;

    Ok(DashboardSnapshot {
        quantity,
        current,
        previous,
        difference: previous.map(|previous| format_difference(current, previous)),
        trend: previous.map(|previous| Trend::between(current, previous)),
        status: RangeStatus::classify(current, thresholds.min, thresholds.max),
        thresholds,
        fetched_at: now,
    })
}
