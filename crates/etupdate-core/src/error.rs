//! Error types for ruleset update operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `UpdateError`.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur while updating the ruleset.
///
/// None of these are retried internally. Every variant is propagated to the
/// caller and leaves the local version file untouched.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// A request to the version, hash or archive endpoint failed.
    #[error("network error fetching {url}: {reason}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// Transport failure or unexpected status.
        reason: String,
    },

    /// The version endpoint returned something that is not a version number.
    #[error("invalid version number from {url}: {body:?}")]
    InvalidRemoteVersion {
        /// The version endpoint URL.
        url: String,
        /// The response body as received.
        body: String,
    },

    /// The local version file exists but does not hold a version number.
    #[error("corrupt version file {path}: {content:?}")]
    CorruptVersionFile {
        /// Path of the version file.
        path: PathBuf,
        /// The file contents as read.
        content: String,
    },

    /// The downloaded archive does not match its published digest.
    #[error("integrity check failed: expected {expected}, computed {actual}")]
    Integrity {
        /// Digest published by the server (trimmed).
        expected: String,
        /// Digest computed over the downloaded bytes.
        actual: String,
    },

    /// An archive member could escape the extraction root.
    #[error("unsafe archive member {path}: {reason}")]
    UnsafeArchive {
        /// The offending member path as stored in the archive.
        path: PathBuf,
        /// Why the member was rejected.
        reason: String,
    },

    /// The archive could not be decoded as a gzip-compressed tar.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Writing a member into the extraction root failed.
    #[error("failed to extract {path}: {source}")]
    Extraction {
        /// The member being written when the failure occurred.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// Local I/O failed outside of extraction.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpdateError {
    /// Creates an `UnsafeArchive` error for `path`.
    pub(crate) fn unsafe_member(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnsafeArchive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error means the published content was rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use etupdate_core::UpdateError;
    ///
    /// let err = UpdateError::Integrity {
    ///     expected: "abc".into(),
    ///     actual: "def".into(),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = UpdateError::InvalidArchive("truncated".into());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::Integrity { .. } | Self::UnsafeArchive { .. })
    }

    /// Returns `true` if the extraction root may hold partially written files.
    ///
    /// Only extraction failures write into the root; every earlier failure
    /// leaves the filesystem as it was.
    #[must_use]
    pub const fn leaves_partial_state(&self) -> bool {
        matches!(self, Self::Extraction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        let err = UpdateError::Network {
            url: "http://example.invalid/version.txt".into(),
            reason: "connection refused".into(),
        };
        let display = err.to_string();
        assert!(display.contains("network error"));
        assert!(display.contains("version.txt"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn test_corrupt_version_file_display() {
        let err = UpdateError::CorruptVersionFile {
            path: PathBuf::from("/etc/suricata/rules/eto_version"),
            content: "abc".into(),
        };
        let display = err.to_string();
        assert!(display.contains("corrupt version file"));
        assert!(display.contains("eto_version"));
        assert!(display.contains("\"abc\""));
    }

    #[test]
    fn test_unsafe_archive_display() {
        let err = UpdateError::unsafe_member("../../etc/passwd", "parent directory traversal");
        let display = err.to_string();
        assert!(display.contains("unsafe archive member"));
        assert!(display.contains("../../etc/passwd"));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: UpdateError = io_err.into();
        assert!(matches!(err, UpdateError::Io(_)));
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_extraction_error_source_chain() {
        use std::error::Error;

        let err = UpdateError::Extraction {
            path: PathBuf::from("rules/emerging-dns.rules"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.leaves_partial_state());
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_leaves_partial_state_only_for_extraction() {
        let err = UpdateError::Integrity {
            expected: "a".into(),
            actual: "b".into(),
        };
        assert!(!err.leaves_partial_state());

        let err = UpdateError::InvalidArchive("bad gzip header".into());
        assert!(!err.leaves_partial_state());
    }
}
