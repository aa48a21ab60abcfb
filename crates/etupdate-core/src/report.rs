//! Update reporting and progress events.

use std::path::Path;
use std::time::Duration;

use crate::UpdateError;
use crate::types::EntryType;
use crate::updater::UpdateState;

/// Statistics for one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directories created.
    pub directories_created: usize,

    /// Number of symlinks and hardlinks created.
    pub links_created: usize,

    /// Total payload bytes written.
    pub bytes_written: u64,

    /// Time spent extracting.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one extracted member.
    pub fn record(&mut self, entry_type: &EntryType, size: u64) {
        match entry_type {
            EntryType::File => {
                self.files_extracted += 1;
                self.bytes_written = self.bytes_written.saturating_add(size);
            }
            EntryType::Directory => self.directories_created += 1,
            EntryType::Symlink { .. } | EntryType::Hardlink { .. } => self.links_created += 1,
            EntryType::Special | EntryType::Metadata => {}
        }
    }

    /// Returns total number of items written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created + self.links_created
    }
}

/// Installed and published version numbers at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCheck {
    /// Version recorded in the local version file (0 if none).
    pub current: u64,

    /// Version published by the server.
    pub latest: u64,
}

impl VersionCheck {
    /// Returns `true` if the server has a newer ruleset.
    #[must_use]
    pub const fn update_available(&self) -> bool {
        self.latest > self.current
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing newer was published; nothing was downloaded or written.
    UpToDate,

    /// The archive was installed and the version file updated.
    Updated,
}

/// Result of a successful [`Updater::run`](crate::Updater::run).
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// How the run ended.
    pub outcome: UpdateOutcome,

    /// Version installed before the run.
    pub previous_version: u64,

    /// Version published by the server at the start of the run.
    pub latest_version: u64,

    /// Whether the version comparison was skipped.
    pub forced: bool,

    /// Size of the downloaded archive in bytes.
    pub bytes_downloaded: u64,

    /// Verified digest of the archive.
    pub digest: Option<String>,

    /// Extraction statistics, when an archive was installed.
    pub extraction: Option<ExtractionReport>,

    /// Wall-clock time for the whole run.
    pub duration: Duration,
}

impl UpdateReport {
    /// A report for a run that stopped at the version comparison.
    #[must_use]
    pub fn up_to_date(check: VersionCheck, duration: Duration) -> Self {
        Self {
            outcome: UpdateOutcome::UpToDate,
            previous_version: check.current,
            latest_version: check.latest,
            forced: false,
            bytes_downloaded: 0,
            digest: None,
            extraction: None,
            duration,
        }
    }

    /// Returns `true` if rules were installed.
    #[must_use]
    pub fn is_updated(&self) -> bool {
        self.outcome == UpdateOutcome::Updated
    }

    /// Version installed after the run.
    #[must_use]
    pub fn installed_version(&self) -> u64 {
        match self.outcome {
            UpdateOutcome::Updated => self.latest_version,
            UpdateOutcome::UpToDate => self.previous_version,
        }
    }
}

/// Receives progress events from the updater.
///
/// The updater never writes to a global logger; callers decide what to do
/// with these events (log them, drive a progress display, record them in
/// tests).
///
/// # Examples
///
/// ```
/// use etupdate_core::UpdateError;
/// use etupdate_core::UpdateObserver;
/// use etupdate_core::UpdateReport;
/// use etupdate_core::UpdateState;
/// use etupdate_core::types::EntryType;
/// use std::path::Path;
///
/// struct PrintObserver;
///
/// impl UpdateObserver for PrintObserver {
///     fn on_transition(&mut self, from: UpdateState, to: UpdateState) {
///         println!("{from} -> {to}");
///     }
///
///     fn on_versions(&mut self, current: u64, latest: u64) {
///         println!("current {current}, latest {latest}");
///     }
///
///     fn on_downloaded(&mut self, url: &str, bytes: u64) {
///         println!("fetched {bytes} bytes from {url}");
///     }
///
///     fn on_member_extracted(&mut self, path: &Path, _entry_type: &EntryType) {
///         println!("extracted {}", path.display());
///     }
///
///     fn on_failed(&mut self, state: UpdateState, error: &UpdateError) {
///         eprintln!("failed while {state}: {error}");
///     }
///
///     fn on_complete(&mut self, report: &UpdateReport) {
///         println!("installed version {}", report.installed_version());
///     }
/// }
/// ```
pub trait UpdateObserver {
    /// Called on every state change.
    fn on_transition(&mut self, from: UpdateState, to: UpdateState);

    /// Called once both version numbers are known.
    fn on_versions(&mut self, current: u64, latest: u64);

    /// Called after the archive has been downloaded.
    fn on_downloaded(&mut self, url: &str, bytes: u64);

    /// Called after each member is written.
    fn on_member_extracted(&mut self, path: &Path, entry_type: &EntryType);

    /// Called when the run fails, with the state the failure occurred in.
    fn on_failed(&mut self, state: UpdateState, error: &UpdateError);

    /// Called when the run finishes successfully.
    fn on_complete(&mut self, report: &UpdateReport);
}

impl<O: UpdateObserver + ?Sized> UpdateObserver for &mut O {
    fn on_transition(&mut self, from: UpdateState, to: UpdateState) {
        (**self).on_transition(from, to);
    }

    fn on_versions(&mut self, current: u64, latest: u64) {
        (**self).on_versions(current, latest);
    }

    fn on_downloaded(&mut self, url: &str, bytes: u64) {
        (**self).on_downloaded(url, bytes);
    }

    fn on_member_extracted(&mut self, path: &Path, entry_type: &EntryType) {
        (**self).on_member_extracted(path, entry_type);
    }

    fn on_failed(&mut self, state: UpdateState, error: &UpdateError) {
        (**self).on_failed(state, error);
    }

    fn on_complete(&mut self, report: &UpdateReport) {
        (**self).on_complete(report);
    }
}

/// Observer that discards every event.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl UpdateObserver for NoopObserver {
    fn on_transition(&mut self, _from: UpdateState, _to: UpdateState) {}

    fn on_versions(&mut self, _current: u64, _latest: u64) {}

    fn on_downloaded(&mut self, _url: &str, _bytes: u64) {}

    fn on_member_extracted(&mut self, _path: &Path, _entry_type: &EntryType) {}

    fn on_failed(&mut self, _state: UpdateState, _error: &UpdateError) {}

    fn on_complete(&mut self, _report: &UpdateReport) {}
}
