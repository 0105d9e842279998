use crate::commands::base_commands::Commands;
use crate::commands::context::CommandContext;
use crate::commands::monitor_error::MonitorError;
use crate::commands::report_format::format_snapshot;
use crate::domain::quantity::Quantity;
use crate::services::poller::fetch_snapshot;

pub async fn current_command(ctx: &CommandContext, cmd: Commands) -> Result<(), MonitorError> {
    if let Commands::Current { quantity } = cmd {
        let source = ctx.source()?;
        let settings = ctx.settings();
        let now = ctx.clock.now();
        for quantity in selected_quantities(quantity) {
            let snapshot =
                fetch_snapshot(source.as_ref(), &settings, quantity, now, now.date_naive()).await?;
            println!("{}", format_snapshot(&snapshot));
        }
    }
    Ok(())
}

/// One quantity when requested, otherwise both.
pub fn selected_quantities(quantity: Option<Quantity>) -> Vec<Quantity> {
    match quantity {
        Some(quantity) => vec![quantity],
        None => Quantity::ALL.to_vec(),
    }
}
