//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use etupdate_core::UpdateReport;
use etupdate_core::VersionCheck;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;

        if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn headline(&self, marker: &str, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style(marker).green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    // runs from cron, so an update prints nothing unless asked to
    fn format_update_result(&self, report: &UpdateReport) -> Result<()> {
        if self.quiet || !self.verbose {
            return Ok(());
        }

        if !report.is_updated() {
            self.headline(
                "✓",
                &format!("Rules are up to date (version {})", report.installed_version()),
            );
            return Ok(());
        }

        let headline = if report.forced && report.previous_version == report.latest_version {
            format!("Reinstalled rules version {}", report.latest_version)
        } else {
            format!(
                "Updated rules from version {} to {}",
                report.previous_version, report.latest_version
            )
        };
        self.headline("✓", &headline);

        if let Some(extraction) = &report.extraction {
            let _ = self
                .term
                .write_line(&format!("  Files extracted: {}", extraction.files_extracted));
            let _ = self.term.write_line(&format!(
                "  Total size: {}",
                Self::format_size(extraction.bytes_written)
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Downloaded: {}",
            Self::format_size(report.bytes_downloaded)
        ));
        if let Some(digest) = &report.digest {
            let _ = self.term.write_line(&format!("  Checksum: {digest}"));
        }
        let _ = self
            .term
            .write_line(&format!("  Duration: {:?}", report.duration));

        Ok(())
    }

    fn format_check_result(&self, check: &VersionCheck) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if check.update_available() {
            let message = format!(
                "Update available: version {} (installed {})",
                check.latest, check.current
            );
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{} {message}", style("↑").yellow().bold()));
            } else {
                let _ = self.term.write_line(&message);
            }
        } else {
            self.headline(
                "✓",
                &format!(
                    "Rules are up to date (installed {}, latest {})",
                    check.current, check.latest
                ),
            );
        }

        Ok(())
    }

    // anyhow prints the error when main returns it
    fn format_error(&self, _operation: &str, _error: &anyhow::Error) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(512), "512 B");
        assert_eq!(HumanFormatter::format_size(2048), "2.0 KB");
        assert_eq!(HumanFormatter::format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
