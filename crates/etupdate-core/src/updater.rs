//! The update state machine.

use std::fmt;
use std::io::Seek;
use std::io::SeekFrom;
use std::time::Instant;

use crate::Result;
use crate::UpdateError;
use crate::UpdaterConfig;
use crate::archive::RulesArchive;
use crate::extraction::ExtractOptions;
use crate::fetch::Fetcher;
use crate::integrity::hash_stream;
use crate::integrity::verify_digest;
use crate::report::UpdateObserver;
use crate::report::UpdateOutcome;
use crate::report::UpdateReport;
use crate::report::VersionCheck;
use crate::types::DestDir;
use crate::version::parse_version;
use crate::version::read_current_version;
use crate::version::write_current_version;

/// Where a run currently stands.
///
/// A run moves `Idle → CheckVersion → (UpToDate | Downloading) → Verifying →
/// ValidatingSafety → Extracting → Persisting → Done`. Any error moves it to
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateState {
    /// No run has started.
    Idle,
    /// Reading the local and published version numbers.
    CheckVersion,
    /// Nothing newer was published; terminal.
    UpToDate,
    /// Fetching the digest and the archive.
    Downloading,
    /// Hashing the archive and comparing against the digest.
    Verifying,
    /// Checking every member path and link target.
    ValidatingSafety,
    /// Unpacking into the installation root.
    Extracting,
    /// Recording the new version number.
    Persisting,
    /// The update completed; terminal.
    Done,
    /// The run stopped on an error; terminal.
    Failed,
}

impl UpdateState {
    /// Returns `true` for states a run ends in.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::UpToDate | Self::Done | Self::Failed)
    }
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::CheckVersion => "checking version",
            Self::UpToDate => "up to date",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::ValidatingSafety => "validating archive",
            Self::Extracting => "extracting",
            Self::Persisting => "persisting version",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one ruleset update.
///
/// The updater owns its configuration, talks to the network only through
/// `F` and reports every step to `O`.
///
/// # Examples
///
/// ```no_run
/// use etupdate_core::HttpFetcher;
/// use etupdate_core::NoopObserver;
/// use etupdate_core::Updater;
/// use etupdate_core::UpdaterConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = UpdaterConfig::default();
/// let fetcher = HttpFetcher::from_config(&config)?;
/// let mut updater = Updater::new(config, fetcher, NoopObserver);
///
/// let report = updater.run(false)?;
/// println!("installed version {}", report.installed_version());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Updater<F, O> {
    config: UpdaterConfig,
    fetcher: F,
    observer: O,
    state: UpdateState,
}

impl<F: Fetcher, O: UpdateObserver> Updater<F, O> {
    /// Creates an idle updater.
    pub fn new(config: UpdaterConfig, fetcher: F, observer: O) -> Self {
        Self {
            config,
            fetcher,
            observer,
            state: UpdateState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// The configuration this updater was built with.
    #[must_use]
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// The observer receiving events.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Reads the installed and published version numbers without changing
    /// anything.
    ///
    /// # Errors
    ///
    /// - `UpdateError::CorruptVersionFile` if the local file is unreadable as
    ///   a number
    /// - `UpdateError::Network` if the version endpoint cannot be reached
    /// - `UpdateError::InvalidRemoteVersion` if it does not return a number
    pub fn check(&mut self) -> Result<VersionCheck> {
        let current = read_current_version(&self.config.version_file)?;

        let url = &self.config.version_url;
        let body = self.fetcher.fetch_text(url)?;
        let latest = parse_version(&body).ok_or_else(|| UpdateError::InvalidRemoteVersion {
            url: url.clone(),
            body,
        })?;

        self.observer.on_versions(current, latest);
        Ok(VersionCheck { current, latest })
    }

    /// Performs one update.
    ///
    /// Without `force`, the run stops at [`UpdateState::UpToDate`] when the
    /// published version is not newer than the installed one, without
    /// requesting the digest or archive. The version file is written only
    /// after every member has been extracted.
    ///
    /// # Errors
    ///
    /// Any failure moves the updater to [`UpdateState::Failed`], is reported
    /// through [`UpdateObserver::on_failed`] and is returned unchanged. The
    /// version file is left as it was; only an `UpdateError::Extraction` can
    /// leave files in the installation root.
    pub fn run(&mut self, force: bool) -> Result<UpdateReport> {
        let start = Instant::now();
        self.transition(UpdateState::CheckVersion);

        match self.run_steps(force, start) {
            Ok(report) => {
                self.observer.on_complete(&report);
                Ok(report)
            }
            Err(err) => {
                let failed_in = self.state;
                self.transition(UpdateState::Failed);
                self.observer.on_failed(failed_in, &err);
                Err(err)
            }
        }
    }

    fn run_steps(&mut self, force: bool, start: Instant) -> Result<UpdateReport> {
        let check = self.check()?;

        if !force && !check.update_available() {
            self.transition(UpdateState::UpToDate);
            return Ok(UpdateReport::up_to_date(check, start.elapsed()));
        }

        self.transition(UpdateState::Downloading);
        let expected = self.fetcher.fetch_text(&self.config.hash_url)?;
        let mut spool = tempfile::tempfile()?;
        let bytes_downloaded = self.fetcher.download(&self.config.archive_url, &mut spool)?;
        self.observer
            .on_downloaded(&self.config.archive_url, bytes_downloaded);

        self.transition(UpdateState::Verifying);
        spool.seek(SeekFrom::Start(0))?;
        let digest = hash_stream(&mut spool, self.config.hash_algorithm)?;
        verify_digest(&digest, &expected)?;

        self.transition(UpdateState::ValidatingSafety);
        let dest = DestDir::create(&self.config.install_root)?;
        let mut archive = RulesArchive::new(spool);
        archive.check_safety(&dest)?;

        self.transition(UpdateState::Extracting);
        let options = ExtractOptions {
            preserve_permissions: self.config.preserve_permissions,
            ..ExtractOptions::default()
        };
        let extraction = archive.extract_all(&dest, &options, &mut self.observer)?;

        self.transition(UpdateState::Persisting);
        write_current_version(&self.config.version_file, check.latest)?;

        self.transition(UpdateState::Done);
        Ok(UpdateReport {
            outcome: UpdateOutcome::Updated,
            previous_version: check.current,
            latest_version: check.latest,
            forced: force,
            bytes_downloaded,
            digest: Some(digest),
            extraction: Some(extraction),
            duration: start.elapsed(),
        })
    }

    fn transition(&mut self, to: UpdateState) {
        let from = self.state;
        self.state = to;
        self.observer.on_transition(from, to);
    }
}
