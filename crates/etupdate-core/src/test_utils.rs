//! Test utilities: in-memory archives, a canned fetcher and a recording
//! observer.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::Result;
use crate::UpdateError;
use crate::fetch::Fetcher;
use crate::report::UpdateObserver;
use crate::report::UpdateOutcome;
use crate::report::UpdateReport;
use crate::types::EntryType;
use crate::updater::UpdateState;

/// Builder for TAR test archives with various entry types.
///
/// # Examples
///
/// ```
/// use etupdate_core::test_utils::TarTestBuilder;
///
/// let archive = TarTestBuilder::new()
///     .add_directory("rules/")
///     .add_file("rules/emerging-dns.rules", b"alert dns any any -> any any;")
///     .add_symlink("rules/current.rules", "emerging-dns.rules")
///     .build_gz();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Modification time stamped on every member.
    pub const MTIME: u64 = 1_700_000_000;

    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    fn header(entry_type: tar::EntryType, size: u64, mode: u32) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(size);
        header.set_mode(mode);
        header.set_mtime(Self::MTIME);
        header
    }

    /// Adds a regular file with mode 0644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, mode);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file whose name is written verbatim into the header.
    ///
    /// `tar::Builder` refuses `..` and absolute paths, which is exactly what
    /// hostile archives contain.
    #[must_use]
    pub fn add_file_raw_path(mut self, path: &str, data: &[u8]) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, 0o644);
        let name = &mut header.as_old_mut().name;
        assert!(path.len() < name.len(), "raw path too long: {path}");
        name.fill(0);
        name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Adds a directory with mode 0755.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Directory, 0, 0o755);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink. The target is stored unchecked.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Symlink, 0, 0o777);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a hardlink. The target is stored unchecked.
    #[must_use]
    pub fn add_hardlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Link, 0, 0o644);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a FIFO.
    #[must_use]
    pub fn add_fifo(mut self, path: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Fifo, 0, 0o644);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Builds the uncompressed TAR data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }

    /// Builds the archive and gzip-compresses it, as the server publishes it.
    #[must_use]
    pub fn build_gz(self) -> Vec<u8> {
        let tar = self.build();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory [`Fetcher`] serving canned bodies and logging every request.
///
/// Unknown URLs fail with a 404-style `UpdateError::Network`.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, std::result::Result<Vec<u8>, String>>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    /// Creates a fetcher with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), Ok(body.into()));
        self
    }

    /// Fails requests for `url` with `reason`.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Err(reason.into()));
        self
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Returns `true` if `url` was requested at least once.
    #[must_use]
    pub fn was_requested(&self, url: &str) -> bool {
        self.requests.borrow().iter().any(|r| r == url)
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(reason)) => Err(UpdateError::Network {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Err(UpdateError::Network {
                url: url.to_string(),
                reason: "server responded with 404 Not Found".to_string(),
            }),
        }
    }
}

/// Observer that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    /// Every `(from, to)` transition.
    pub transitions: Vec<(UpdateState, UpdateState)>,

    /// `(current, latest)` once known.
    pub versions: Option<(u64, u64)>,

    /// `(url, bytes)` for each download.
    pub downloads: Vec<(String, u64)>,

    /// Paths of extracted members.
    pub extracted: Vec<PathBuf>,

    /// State and message of each failure.
    pub failures: Vec<(UpdateState, String)>,

    /// Outcome of the completed run.
    pub completed: Option<UpdateOutcome>,
}

impl RecordingObserver {
    /// Target states in the order they were entered.
    #[must_use]
    pub fn states(&self) -> Vec<UpdateState> {
        self.transitions.iter().map(|(_, to)| *to).collect()
    }
}

impl UpdateObserver for RecordingObserver {
    fn on_transition(&mut self, from: UpdateState, to: UpdateState) {
        self.transitions.push((from, to));
    }

    fn on_versions(&mut self, current: u64, latest: u64) {
        self.versions = Some((current, latest));
    }

    fn on_downloaded(&mut self, url: &str, bytes: u64) {
        self.downloads.push((url.to_string(), bytes));
    }

    fn on_member_extracted(&mut self, path: &Path, _entry_type: &EntryType) {
        self.extracted.push(path.to_path_buf());
    }

    fn on_failed(&mut self, state: UpdateState, error: &UpdateError) {
        self.failures.push((state, error.to_string()));
    }

    fn on_complete(&mut self, report: &UpdateReport) {
        self.completed = Some(report.outcome);
    }
}
