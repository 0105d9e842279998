use crate::commands::base_commands::Commands;
use crate::commands::context::CommandContext;
use crate::commands::monitor_error::MonitorError;
use crate::services::validation::{ValidationError, parse_date};

pub async fn day_average_command(ctx: &CommandContext, cmd: Commands) -> Result<(), MonitorError> {
    if let Commands::DayAverage { quantity, date } = cmd {
        let date = match date {
            Some(date) => parse_date(&date)?,
            None => ctx.clock.today(),
        };
        let source = ctx.source()?;
        let average = source.day_average(quantity, date).await?;
        println!(
            "{} average on {}: {}",
            quantity.label(),
            date.format("%Y-%m-%d"),
            quantity.format_value(average)
        );
    }
    Ok(())
}

pub async fn range_average_command(ctx: &CommandContext, cmd: Commands) -> Result<(), MonitorError> {
    if let Commands::RangeAverage {
        quantity,
        start,
        end,
    } = cmd
    {
        let start = parse_date(&start)?;
        let end = parse_date(&end)?;
        if end < start {
            return Err(ValidationError::EndBeforeStart { start, end }.into());
        }
        let source = ctx.source()?;
        let average = source.average_between_days(quantity, start, end).await?;
        println!(
            "{} average {} - {}: {}",
            quantity.label(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            quantity.format_value(average)
        );
    }
    Ok(())
}
