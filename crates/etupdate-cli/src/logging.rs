//! Log setup and the observer that turns update events into log records.

use std::path::Path;

use etupdate_core::UpdateError;
use etupdate_core::UpdateObserver;
use etupdate_core::UpdateReport;
use etupdate_core::UpdateState;
use etupdate_core::types::EntryType;
use tracing::debug;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber.
///
/// Only errors are logged unless `verbose` is set. `RUST_LOG` overrides both.
/// Records go to stderr so `--json` output on stdout stays parseable.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Logs each update event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl UpdateObserver for TracingObserver {
    fn on_transition(&mut self, from: UpdateState, to: UpdateState) {
        debug!(%from, %to, "state change");
        match to {
            UpdateState::Downloading => info!("Downloading rules..."),
            UpdateState::Verifying => info!("Verifying checksum..."),
            UpdateState::ValidatingSafety => info!("Checking archive members..."),
            UpdateState::Extracting => info!("Extracting rules..."),
            _ => {}
        }
    }

    fn on_versions(&mut self, current: u64, latest: u64) {
        info!("Latest version: {latest}");
        info!("Current version: {current}");
    }

    fn on_downloaded(&mut self, url: &str, bytes: u64) {
        info!(url, bytes, "Downloaded archive");
    }

    fn on_member_extracted(&mut self, path: &Path, entry_type: &EntryType) {
        debug!(path = %path.display(), kind = entry_type.name(), "extracted");
    }

    // main reports the error itself; this only records where it happened
    fn on_failed(&mut self, state: UpdateState, error: &UpdateError) {
        warn!(%state, "update stopped: {error}");
    }

    fn on_complete(&mut self, report: &UpdateReport) {
        if report.is_updated() {
            info!("Installed rules version {}", report.installed_version());
        } else {
            info!("Rules are up to date");
        }
    }
}
