//! Update command implementation.

use crate::cli::Cli;
use crate::error::add_update_context;
use crate::logging::TracingObserver;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use etupdate_core::HttpFetcher;
use etupdate_core::Updater;

pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = cli.updater_config();
    let fetcher = HttpFetcher::from_config(&config).context("failed to initialize HTTP client")?;

    let mut updater = Updater::new(config, fetcher, TracingObserver);
    let report = add_update_context(updater.run(cli.force))?;

    formatter.format_update_result(&report)?;

    Ok(())
}
