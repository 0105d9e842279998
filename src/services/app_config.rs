use std::env;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::services::poller::{DASHBOARD_REFRESH_SECS, TOKEN_REFRESH_SECS};
use crate::services::simulator::SimulatorConfig;

pub const CONFIG_PATH_VAR: &str = "WHISKEY_MONITOR_CONFIG";
pub const API_URL_VAR: &str = "WHISKEY_API_URL";
pub const USE_MOCK_VAR: &str = "WHISKEY_USE_MOCK_SENSORS";
pub const STATE_FILE_VAR: &str = "WHISKEY_STATE_FILE";

const DEFAULT_STATE_FILE: &str = ".whiskey-monitor/state.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL including any `/api` prefix.
    pub base_url: String,
    /// Serve sensor data from the simulator instead of the backend.
    pub use_mock_sensors: bool,
    pub state_file: PathBuf,
    pub refresh_interval_secs: u64,
    pub token_refresh_interval_secs: u64,
    pub simulator: SimulatorSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            use_mock_sensors: true,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            refresh_interval_secs: DASHBOARD_REFRESH_SECS,
            token_refresh_interval_secs: TOKEN_REFRESH_SECS,
            simulator: SimulatorSettings::default(),
        }
    }
}

/// Simulator knobs exposed in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    pub reading_frequency_minutes: u32,
    pub sensor_id: String,
    pub data_start: NaiveDate,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        let defaults = SimulatorConfig::default();
        Self {
            reading_frequency_minutes: defaults.reading_frequency_minutes,
            sensor_id: defaults.sensor_id,
            data_start: defaults.data_start,
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let path = PathBuf::from(path);
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Reads `.env`, then the YAML file named by `path` or
    /// `WHISKEY_MONITOR_CONFIG`, then applies environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let path = path
            .map(str::to_string)
            .or_else(|| env::var(CONFIG_PATH_VAR).ok());
        let mut config = match path {
            Some(path) => {
                log::debug!("Loading config from {path}");
                Self::from_yaml_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_VAR) {
            self.base_url = url;
        }
        if let Some(value) = lookup(USE_MOCK_VAR) {
            self.use_mock_sensors = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: USE_MOCK_VAR,
                        value,
                    });
                }
            };
        }
        if let Some(path) = lookup(STATE_FILE_VAR) {
            self.state_file = PathBuf::from(path);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.simulator.reading_frequency_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "simulator.reading_frequency_minutes",
                value: "0".to_string(),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "refresh_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.token_refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "token_refresh_interval_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            reading_frequency_minutes: self.simulator.reading_frequency_minutes,
            sensor_id: self.simulator.sensor_id.clone(),
            data_start: self.simulator.data_start,
            ..SimulatorConfig::default()
        }
    }
}
