//! Check command implementation.

use crate::cli::Cli;
use crate::error::add_update_context;
use crate::logging::TracingObserver;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use etupdate_core::HttpFetcher;
use etupdate_core::Updater;

/// Reports whether a newer ruleset is published without downloading it.
pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = cli.updater_config();
    let fetcher = HttpFetcher::from_config(&config).context("failed to initialize HTTP client")?;

    let check = add_update_context(Updater::new(config, fetcher, TracingObserver).check())?;

    formatter.format_check_result(&check)?;

    Ok(())
}
