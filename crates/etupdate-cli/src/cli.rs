//! CLI argument parsing using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::ValueEnum;
use etupdate_core::HashAlgorithm;
use etupdate_core::UpdaterConfig;
use etupdate_core::config::DEFAULT_INSTALL_ROOT;
use etupdate_core::config::DEFAULT_URL_ROOT;

#[derive(Parser)]
#[command(name = "etupdate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log progress and print a summary after updating
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the --check report too; errors are still reported
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Install even if the published version is not newer
    #[arg(short, long)]
    pub force: bool,

    /// Only report whether a newer ruleset is published
    #[arg(long, conflicts_with = "force")]
    pub check: bool,

    /// Suricata installation root; rules are extracted beneath it
    #[arg(long, value_name = "DIR", default_value = DEFAULT_INSTALL_ROOT)]
    pub root: PathBuf,

    /// Base URL serving version.txt and the rules archive
    #[arg(long, value_name = "URL", default_value = DEFAULT_URL_ROOT)]
    pub url_root: String,

    /// Checksum published next to the archive
    #[arg(long, value_enum, default_value_t = HashArg::Md5)]
    pub hash: HashArg,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Keep setuid, setgid and sticky bits from the archive
    #[arg(long)]
    pub preserve_permissions: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HashArg {
    Md5,
    Sha256,
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Md5 => Self::Md5,
            HashArg::Sha256 => Self::Sha256,
        }
    }
}

impl Cli {
    /// Builds the updater configuration from the command line.
    pub fn updater_config(&self) -> UpdaterConfig {
        let mut config = UpdaterConfig::from_url_root(&self.url_root, &self.root)
            .with_hash_algorithm(self.hash.into());
        config.timeout = Duration::from_secs(self.timeout);
        config.preserve_permissions = self.preserve_permissions;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["etupdate"]);
        let config = cli.updater_config();
        assert!(!cli.force);
        assert!(!cli.check);
        assert_eq!(config.install_root, PathBuf::from("/etc/suricata"));
        assert_eq!(
            config.hash_url,
            "http://rules.emergingthreats.net/open/suricata/emerging.rules.tar.gz.md5"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "etupdate",
            "-f",
            "--root",
            "/opt/suricata",
            "--url-root",
            "http://mirror.local/et/",
            "--hash",
            "sha256",
            "--timeout",
            "5",
        ]);
        let config = cli.updater_config();
        assert!(cli.force);
        assert_eq!(config.version_url, "http://mirror.local/et/version.txt");
        assert_eq!(
            config.hash_url,
            "http://mirror.local/et/emerging.rules.tar.gz.sha256"
        );
        assert_eq!(config.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(
            config.version_file,
            PathBuf::from("/opt/suricata/rules/eto_version")
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_check_conflicts_with_force() {
        assert!(Cli::try_parse_from(["etupdate", "--check", "--force"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["etupdate", "--timeout", "0"]).is_err());
    }
}
