//! Error conversion utilities for CLI.
//!
//! Converts etupdate-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use etupdate_core::UpdateError;

/// Converts `UpdateError` to a user-friendly anyhow error with a hint
pub fn convert_update_error(err: UpdateError) -> anyhow::Error {
    match err {
        UpdateError::Network { url, reason } => {
            anyhow!(
                "Failed to fetch '{url}': {reason}\n\
                 HINT: Check network access to the rules server, or use --url-root to point at a mirror."
            )
        }
        UpdateError::InvalidRemoteVersion { url, body } => {
            anyhow!(
                "Server returned an invalid version number from '{url}': {body:?}\n\
                 HINT: The URL root may not serve an Emerging Threats ruleset."
            )
        }
        UpdateError::CorruptVersionFile { path, content } => {
            anyhow!(
                "Version file '{}' is corrupt: {content:?}\n\
                 HINT: Delete the file and run with --force to reinstall the rules.",
                path.display()
            )
        }
        UpdateError::Integrity { expected, actual } => {
            anyhow!(
                "Security violation: downloaded archive does not match its checksum\n\
                 Expected: {expected}\n\
                 Computed: {actual}\n\
                 HINT: The download may be truncated or tampered with. Nothing was installed; retry later."
            )
        }
        UpdateError::UnsafeArchive { path, reason } => {
            anyhow!(
                "Security violation: archive member '{}' rejected ({reason})\n\
                 HINT: This archive may be malicious. Nothing was extracted.",
                path.display()
            )
        }
        UpdateError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive: {reason}\n\
                 HINT: The archive may be corrupted or malformed."
            )
        }
        UpdateError::Extraction { path, source } => {
            anyhow!(
                "Failed to extract '{}': {source}\n\
                 HINT: Some rule files may have been updated; the version file was not. \
                 Check permissions on the installation root and rerun with --force.",
                path.display()
            )
        }
        err @ UpdateError::Io(_) => anyhow::Error::from(err).context("Update failed"),
    }
}

/// Converts the error of a core result for display
pub fn add_update_context<T>(result: Result<T, UpdateError>) -> anyhow::Result<T> {
    result.map_err(convert_update_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_unsafe_archive_error() {
        let err = UpdateError::UnsafeArchive {
            path: PathBuf::from("../../etc/passwd"),
            reason: "parent directory traversal".into(),
        };
        let msg = format!("{:?}", convert_update_error(err));
        assert!(msg.contains("../../etc/passwd"));
        assert!(msg.contains("Security violation"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_integrity_error() {
        let err = UpdateError::Integrity {
            expected: "aaaa".into(),
            actual: "bbbb".into(),
        };
        let msg = format!("{:?}", convert_update_error(err));
        assert!(msg.contains("Expected: aaaa"));
        assert!(msg.contains("Computed: bbbb"));
    }

    #[test]
    fn test_convert_network_error_mentions_url() {
        let err = UpdateError::Network {
            url: "http://rules.test/version.txt".into(),
            reason: "request timed out".into(),
        };
        let msg = format!("{:?}", convert_update_error(err));
        assert!(msg.contains("http://rules.test/version.txt"));
        assert!(msg.contains("--url-root"));
    }

    #[test]
    fn test_convert_io_error() {
        let err = UpdateError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let msg = format!("{:?}", convert_update_error(err));
        assert!(msg.contains("Update failed"));
        assert!(msg.contains("denied"));
    }
}
