use thiserror::Error;

use crate::services::app_config::ConfigError;
use crate::services::data_source::SourceError;
use crate::services::kv_store::StoreError;
use crate::services::poller::SnapshotError;
use crate::services::report::ReportError;
use crate::services::report_chart::ReportChartError;
use crate::services::session::SessionError;
use crate::services::settings::SettingsError;
use crate::services::validation::ValidationError;

/// Everything a command can fail with.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Chart(#[from] ReportChartError),
    #[error("failed to serialize output: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("not logged in, run `whiskey-monitor login` first")]
    NotLoggedIn,
    #[error("no backend configured, set base_url or {}", crate::services::app_config::API_URL_VAR)]
    MissingBaseUrl,
}
