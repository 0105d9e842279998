use std::sync::Arc;

use crate::commands::monitor_error::MonitorError;
use crate::domain::session::UserProfile;
use crate::services::app_config::AppConfig;
use crate::services::clock::{Clock, SystemClock};
use crate::services::data_source::SensorSource;
use crate::services::kv_store::{JsonFileStore, KeyValueStore};
use crate::services::sensor_api::SensorApiClient;
use crate::services::session::{AuthApi, SessionManager};
use crate::services::settings::ThresholdSettings;
use crate::services::simulated_source::SimulatedSource;
use crate::services::simulator::EnvironmentSimulator;

/// Shared wiring for every command: config, persisted client state and time.
pub struct CommandContext {
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl CommandContext {
    pub fn from_config(config: AppConfig) -> Result<Self, MonitorError> {
        let store = JsonFileStore::open(&config.state_file)?;
        Ok(Self::new(config, Arc::new(store), Arc::new(SystemClock)))
    }

    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            store,
        }
    }

    /// Readings come from the simulator when mocking is on or no backend is set.
    pub fn uses_mock_sensors(&self) -> bool {
        self.config.use_mock_sensors || self.config.base_url.trim().is_empty()
    }

    /// Session bound to the configured backend, for calls that reach it.
    pub fn session(&self) -> Result<SessionManager, MonitorError> {
        if self.config.base_url.trim().is_empty() {
            return Err(MonitorError::MissingBaseUrl);
        }
        Ok(self.local_session())
    }

    /// Session usable for store-only operations such as logout.
    pub fn local_session(&self) -> SessionManager {
        SessionManager::new(self.store.clone(), AuthApi::new(&self.config.base_url))
    }

    pub fn settings(&self) -> ThresholdSettings {
        ThresholdSettings::new(self.store.clone())
    }

    /// The logged-in user. Expired sessions are cleared and rejected.
    pub fn require_login(&self) -> Result<UserProfile, MonitorError> {
        self.session()?
            .restore(self.clock.now())?
            .ok_or(MonitorError::NotLoggedIn)
    }

    pub fn source(&self) -> Result<Box<dyn SensorSource>, MonitorError> {
        if self.uses_mock_sensors() {
            log::debug!("Using simulated sensor data");
            let simulator = EnvironmentSimulator::new(self.config.simulator_config());
            return Ok(Box::new(SimulatedSource::new(simulator, self.clock.clone())));
        }
        let session = self.session()?;
        let user = self.require_login()?;
        log::debug!("Reading sensors from {} as {}", self.config.base_url, user.username);
        Ok(Box::new(SensorApiClient::new(
            &self.config.base_url,
            session,
            self.clock.clone(),
        )?))
    }
}
