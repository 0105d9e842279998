use crate::commands::base_commands::Commands;
use crate::commands::context::CommandContext;
use crate::commands::monitor_error::MonitorError;
use crate::commands::report_format::format_report;
use crate::services::csv_export::{report_file_name, write_report_csv};
use crate::services::report::{default_report_range, generate_report};
use crate::services::report_chart::write_report_chart_png;
use crate::services::validation::parse_date;

pub async fn report_command(ctx: &CommandContext, cmd: Commands) -> Result<(), MonitorError> {
    if let Commands::Report {
        quantity,
        start,
        end,
        csv,
        chart,
        yaml,
    } = cmd
    {
        let source = ctx.source()?;
        let today = ctx.clock.today();
        let (default_start, default_end) = default_report_range(&source.date_limits(today), today);
        let start = start.as_deref().map(parse_date).transpose()?.unwrap_or(default_start);
        let end = end.as_deref().map(parse_date).transpose()?.unwrap_or(default_end);

        let report = generate_report(source.as_ref(), quantity, start, end, today).await?;
        println!("{}", format_report(&report));

        if let Some(path) = csv {
            let path = path.unwrap_or_else(|| report_file_name(&report));
            let mut buffer = Vec::new();
            write_report_csv(&mut buffer, &report).map_err(|source| MonitorError::Write {
                path: path.clone(),
                source,
            })?;
            write_file(&path, buffer).await?;
            println!("CSV export written to {path}");
        }

        if let Some(path) = chart {
            write_report_chart_png(&path, &report).await?;
            println!("Report chart written to {path}");
        }

        if let Some(path) = yaml {
            let contents = serde_yaml::to_string(&report)?;
            write_file(&path, contents.into_bytes()).await?;
            println!("Report written to {path}");
        }
    }
    Ok(())
}

async fn write_file(path: &str, contents: Vec<u8>) -> Result<(), MonitorError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| MonitorError::Write {
            path: path.to_string(),
            source,
        })
}
