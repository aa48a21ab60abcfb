//! Updater configuration.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::integrity::HashAlgorithm;

/// Base URL of the Emerging Threats open ruleset for Suricata.
pub const DEFAULT_URL_ROOT: &str = "http://rules.emergingthreats.net/open/suricata";

/// Default Suricata installation root; the archive is extracted beneath it.
pub const DEFAULT_INSTALL_ROOT: &str = "/etc/suricata";

/// Name of the archive published under the URL root.
pub const ARCHIVE_NAME: &str = "emerging.rules.tar.gz";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client label sent with every request.
pub const USER_AGENT: &str = concat!("etupdate/", env!("CARGO_PKG_VERSION"));

/// Everything the updater needs to know about where rules come from and
/// where they go.
///
/// Built once at startup and handed to [`Updater::new`](crate::Updater::new).
/// Tests point the URLs at mock endpoints and the roots at temporary
/// directories.
///
/// # Examples
///
/// ```
/// use etupdate_core::UpdaterConfig;
///
/// let config = UpdaterConfig::from_url_root("http://mirror.local/suricata", "/opt/suricata");
/// assert_eq!(config.version_url, "http://mirror.local/suricata/version.txt");
/// assert!(config.version_file.ends_with("rules/eto_version"));
/// ```
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// URL returning the latest published version number.
    pub version_url: String,

    /// URL returning the hex digest of the archive.
    pub hash_url: String,

    /// URL of the gzip-compressed tar archive.
    pub archive_url: String,

    /// Directory the archive is extracted into.
    pub install_root: PathBuf,

    /// File holding the currently installed version number.
    pub version_file: PathBuf,

    /// Digest algorithm the hash URL publishes.
    pub hash_algorithm: HashAlgorithm,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Client label sent as the `User-Agent` header.
    pub user_agent: String,

    /// Keep setuid, setgid and sticky bits from the archive.
    pub preserve_permissions: bool,
}

impl Default for UpdaterConfig {
    /// Emerging Threats open ruleset installed under `/etc/suricata`.
    fn default() -> Self {
        Self::from_url_root(DEFAULT_URL_ROOT, DEFAULT_INSTALL_ROOT)
    }
}

impl UpdaterConfig {
    /// Derives every endpoint from `url_root` and the version file from
    /// `install_root`, using MD5 checksums.
    #[must_use]
    pub fn from_url_root(url_root: &str, install_root: impl Into<PathBuf>) -> Self {
        let install_root = install_root.into();
        let url_root = url_root.trim_end_matches('/');
        let hash_algorithm = HashAlgorithm::default();

        Self {
            version_url: format!("{url_root}/version.txt"),
            hash_url: hash_url_for(url_root, hash_algorithm),
            archive_url: format!("{url_root}/{ARCHIVE_NAME}"),
            version_file: version_file_for(&install_root),
            install_root,
            hash_algorithm,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            preserve_permissions: false,
        }
    }

    /// Switches to a different digest algorithm, pointing the hash URL at the
    /// matching checksum file next to the archive.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        let archive_root = self
            .archive_url
            .strip_suffix(ARCHIVE_NAME)
            .map(|root| root.trim_end_matches('/').to_string());
        if let Some(root) = archive_root {
            self.hash_url = hash_url_for(&root, algorithm);
        }
        self.hash_algorithm = algorithm;
        self
    }
}

fn hash_url_for(url_root: &str, algorithm: HashAlgorithm) -> String {
    format!("{url_root}/{ARCHIVE_NAME}.{}", algorithm.extension())
}

/// Location of the version file for an installation root.
#[must_use]
pub fn version_file_for(install_root: &Path) -> PathBuf {
    install_root.join("rules").join("eto_version")
}
