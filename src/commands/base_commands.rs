use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::domain::quantity::Quantity;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in against the backend and store the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create a new backend account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Clear the stored session and threshold settings
    Logout,
    /// Show current values, trend and threshold status
    Current {
        /// Only show this quantity
        #[arg(short, long, value_enum)]
        quantity: Option<Quantity>,
    },
    /// Keep refreshing current values until Ctrl+C
    Watch {
        /// Only show this quantity
        #[arg(short, long, value_enum)]
        quantity: Option<Quantity>,
        /// Seconds between refreshes (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
        /// Stop after this many refreshes
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Average of one day
    DayAverage {
        #[arg(short, long, value_enum)]
        quantity: Quantity,
        /// Day to average (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Mean of the daily averages over an inclusive date range
    RangeAverage {
        #[arg(short, long, value_enum)]
        quantity: Quantity,
        /// First day (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,
        /// Last day (YYYY-MM-DD)
        #[arg(short, long)]
        end: String,
    },
    /// Build a report with average, min, max and the reading series
    Report {
        #[arg(short, long, value_enum)]
        quantity: Quantity,
        /// First day (YYYY-MM-DD), defaults to seven days ago
        #[arg(short, long)]
        start: Option<String>,
        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        end: Option<String>,
        /// Export the series as CSV, to the given path or a default file name
        #[arg(long, value_name = "PATH")]
        csv: Option<Option<String>>,
        /// Render the series as a PNG chart
        #[arg(long, value_name = "PATH")]
        chart: Option<String>,
        /// Write the full report as YAML
        #[arg(long, value_name = "PATH")]
        yaml: Option<String>,
    },
    /// Manage threshold settings
    Thresholds {
        #[command(subcommand)]
        action: ThresholdsAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ThresholdsAction {
    /// Print the thresholds in effect
    Show,
    /// Store new thresholds for one quantity
    Set {
        #[arg(short, long, value_enum)]
        quantity: Quantity,
        #[arg(long, allow_negative_numbers = true)]
        min: f64,
        #[arg(long, allow_negative_numbers = true)]
        max: f64,
        /// Date (YYYY-MM-DD) on which the settings revert to defaults
        #[arg(long)]
        valid_until: Option<String>,
    },
    /// Restore the defaults for one quantity
    Reset {
        #[arg(short, long, value_enum)]
        quantity: Quantity,
    },
}
