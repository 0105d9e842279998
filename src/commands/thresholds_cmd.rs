use crate::commands::base_commands::ThresholdsAction;
use crate::commands::context::CommandContext;
use crate::commands::monitor_error::MonitorError;
use crate::commands::report_format::format_thresholds;
use crate::domain::quantity::Quantity;
use crate::domain::thresholds::Thresholds;
use crate::services::validation::parse_date;

pub fn thresholds_command(ctx: &CommandContext, action: ThresholdsAction) -> Result<(), MonitorError> {
    let settings = ctx.settings();
    let today = ctx.clock.today();
    match action {
        ThresholdsAction::Show => {
            for quantity in Quantity::ALL {
                let thresholds = settings.load(quantity, today)?;
                println!("{}", format_thresholds(quantity, &thresholds));
            }
        }
        ThresholdsAction::Set {
            quantity,
            min,
            max,
            valid_until,
        } => {
            let valid_until = valid_until.as_deref().map(parse_date).transpose()?;
            let thresholds = Thresholds {
                min,
                max,
                valid_until,
            };
            settings.save(quantity, &thresholds, today)?;
            log::info!("Saved {quantity} thresholds {min}..{max}");
            println!("{}", format_thresholds(quantity, &thresholds));
        }
        ThresholdsAction::Reset { quantity } => {
            settings.reset(quantity)?;
            println!("{}", format_thresholds(quantity, &Thresholds::defaults_for(quantity)));
        }
    }
    Ok(())
}
