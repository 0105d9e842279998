use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::commands::base_commands::Commands;
use crate::commands::context::CommandContext;
use crate::commands::current_cmd::selected_quantities;
use crate::commands::monitor_error::MonitorError;
use crate::commands::report_format::format_snapshot;
use crate::services::poller::{CancellationToken, fetch_snapshot, run_periodic};

pub async fn watch_command(ctx: &CommandContext, cmd: Commands) -> Result<(), MonitorError> {
    if let Commands::Watch {
        quantity,
        interval,
        count,
    } = cmd
    {
        let source = ctx.source()?;
        let settings = ctx.settings();
        let session = if ctx.uses_mock_sensors() {
            None
        } else {
            Some(ctx.session()?)
        };
        let quantities = selected_quantities(quantity);
        let period = Duration::from_secs(interval.unwrap_or(ctx.config.refresh_interval_secs).max(1));
        let token_period = Duration::from_secs(ctx.config.token_refresh_interval_secs);
        let token = CancellationToken::new();
        let refreshes = AtomicUsize::new(0);

        let source = source.as_ref();
        let settings = &settings;
        let quantities = quantities.as_slice();
        let clock = ctx.clock.as_ref();
        let token_ref = &token;
        let refreshes_ref = &refreshes;

        let polling = run_periodic(period, &token, move || async move {
            let now = clock.now();
            for &quantity in quantities {
                match fetch_snapshot(source, settings, quantity, now, now.date_naive()).await {
                    Ok(snapshot) => println!("{}", format_snapshot(&snapshot)),
                    Err(e) => {
                        log::warn!("Failed to refresh {quantity}: {e}");
                        eprintln!("Failed to refresh {quantity}: {e}");
                    }
                }
            }
            let done = refreshes_ref.fetch_add(1, Ordering::SeqCst) + 1;
            if count.is_some_and(|count| done >= count) {
                token_ref.cancel();
            }
        });

        let session_ref = session.as_ref();
        let token_refresh = async move {
            let Some(session) = session_ref else {
                return;
            };
            // The token was just issued or restored; first refresh is one period out.
            let mut first_tick = true;
            run_periodic(token_period, token_ref, move || {
                let skip = std::mem::replace(&mut first_tick, false);
                async move {
                    if skip {
                        return;
                    }
                    if let Err(e) = session.refresh().await {
                        log::error!("Session refresh failed: {e}");
                        token_ref.cancel();
                    }
                }
            })
            .await;
        };

        let interrupt = async {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    match result {
                        Ok(()) => {
                            log::info!("Interrupted, stopping refresh");
                            token.cancel();
                        }
                        Err(e) => log::warn!("Failed to listen for Ctrl+C: {e}"),
                    }
                }
                _ = token.cancelled() => {}
            }
        };

        let (completed, _, _) = tokio::join!(polling, token_refresh, interrupt);
        log::info!("Stopped after {completed} refreshes");

        if session.is_some() && ctx.local_session().access_token().is_none() {
            return Err(MonitorError::NotLoggedIn);
        }
    }
    Ok(())
}
