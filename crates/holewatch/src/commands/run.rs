//! The long-running check cycle, or a single pass of it.

use std::sync::Arc;

use holewatch_config::Config;
use holewatch_core::CycleReport;
use tracing::info;

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output;
use crate::reporter::LogReporter;

pub async fn handle(args: RunArgs, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let watchlist = super::open_watchlist(config)?;
    let reporter = Arc::new(LogReporter::new(
        &config.killboard.base_url,
        &config.scout.hub,
    ));

    if args.once {
        let result = match watchlist.monitor(reporter) {
            Ok(mut monitor) => Ok(monitor.run_cycle().await),
            Err(e) => Err(CliError::from(e)),
        };
        watchlist.shutdown().await;
        return print_report(&result?, global);
    }

    let started = match watchlist.start(reporter).await {
        Ok(started) => started,
        Err(e) => {
            watchlist.shutdown().await;
            return Err(e.into());
        }
    };
    if !started {
        output::notice("Reports are inactive; nothing to run", global.quiet);
        watchlist.shutdown().await;
        return Ok(());
    }

    output::notice(
        &format!(
            "Watching {} systems and {} generics every {}s, Ctrl-C to stop",
            watchlist.roster().len(),
            watchlist.groups().len(),
            watchlist.config().interval.as_secs()
        ),
        global.quiet,
    );
    let signal = tokio::signal::ctrl_c().await;
    info!("shutting down");
    watchlist.shutdown().await;
    signal?;
    Ok(())
}

fn print_report(report: &CycleReport, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        report,
        ToString::to_string,
        |r| r.kills.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
