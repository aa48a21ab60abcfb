//! etupdate - keeps the Emerging Threats Suricata ruleset up to date.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    logging::init_tracing(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let (operation, result) = if cli.check {
        ("check", commands::check::execute(&cli, &*formatter))
    } else {
        ("update", commands::update::execute(&cli, &*formatter))
    };

    if let Err(err) = &result {
        formatter.format_error(operation, err);
    }
    result
}
