mod commands;
mod domain;
mod services;
#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use crate::commands::auth_cmd::{login_command, logout_command, register_command};
use crate::commands::average_cmd::{day_average_command, range_average_command};
use crate::commands::base_commands::{CliArgs, Commands};
use crate::commands::context::CommandContext;
use crate::commands::current_cmd::current_command;
use crate::commands::monitor_error::MonitorError;
use crate::commands::report_cmd::report_command;
use crate::commands::thresholds_cmd::thresholds_command;
use crate::commands::watch_cmd::watch_command;
use crate::services::app_config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let args = CliArgs::parse();
    if let Commands::Completions { shell } = args.command {
        let mut command = CliArgs::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<(), MonitorError> {
    let config = AppConfig::load(args.config.as_deref())?;
    let ctx = CommandContext::from_config(config)?;

    match args.command {
        cmd @ Commands::Login { .. } => login_command(&ctx, cmd).await,
        cmd @ Commands::Register { .. } => register_command(&ctx, cmd).await,
        Commands::Logout => logout_command(&ctx),
        cmd @ Commands::Current { .. } => current_command(&ctx, cmd).await,
        cmd @ Commands::Watch { .. } => watch_command(&ctx, cmd).await,
        cmd @ Commands::DayAverage { .. } => day_average_command(&ctx, cmd).await,
        cmd @ Commands::RangeAverage { .. } => range_average_command(&ctx, cmd).await,
        cmd @ Commands::Report { .. } => report_command(&ctx, cmd).await,
        Commands::Thresholds { action } => thresholds_command(&ctx, action),
        Commands::Completions { .. } => Ok(()),
    }
}
