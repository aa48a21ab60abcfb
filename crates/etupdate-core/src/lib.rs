//! Verified updates of the Emerging Threats Suricata ruleset.
//!
//! `etupdate-core` compares the installed ruleset version with the one
//! published upstream and, when a newer one exists, downloads the archive,
//! verifies it against the published checksum, rejects it if any member
//! could land outside the installation root, extracts it and records the new
//! version.
//!
//! # Examples
//!
//! ```no_run
//! use etupdate_core::HttpFetcher;
//! use etupdate_core::NoopObserver;
//! use etupdate_core::Updater;
//! use etupdate_core::UpdaterConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UpdaterConfig::from_url_root(
//!     "http://rules.emergingthreats.net/open/suricata",
//!     "/etc/suricata",
//! );
//! let fetcher = HttpFetcher::from_config(&config)?;
//! let report = Updater::new(config, fetcher, NoopObserver).run(false)?;
//! println!("{:?}: version {}", report.outcome, report.installed_version());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod integrity;
pub mod report;
pub mod security;
#[doc(hidden)]
pub mod test_utils;
pub mod types;
pub mod updater;
pub mod version;

// Re-export main API types
pub use config::UpdaterConfig;
pub use error::Result;
pub use error::UpdateError;
pub use fetch::Fetcher;
pub use fetch::HttpFetcher;
pub use integrity::HashAlgorithm;
pub use report::ExtractionReport;
pub use report::NoopObserver;
pub use report::UpdateObserver;
pub use report::UpdateOutcome;
pub use report::UpdateReport;
pub use report::VersionCheck;
pub use updater::UpdateState;
pub use updater::Updater;
