pub mod auth_cmd;
pub mod average_cmd;
pub mod base_commands;
pub mod context;
pub mod current_cmd;
pub mod monitor_error;
pub mod report_cmd;
pub mod report_format;
pub mod thresholds_cmd;
pub mod watch_cmd;
