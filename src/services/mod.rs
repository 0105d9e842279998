pub mod app_config;
pub mod clock;
pub mod csv_export;
pub mod data_source;
pub mod kv_store;
pub mod poller;
pub mod report;
pub mod report_chart;
pub mod sensor_api;
pub mod session;
pub mod settings;
pub mod simulated_source;
pub mod simulator;
pub mod trend;
pub mod validation;
