//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use etupdate_core::UpdateOutcome;
use etupdate_core::UpdateReport;
use etupdate_core::VersionCheck;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ExtractionOutput {
    files_extracted: usize,
    directories_created: usize,
    links_created: usize,
    bytes_written: u64,
    duration_ms: u128,
}

#[derive(Serialize)]
struct UpdateOutput {
    outcome: &'static str,
    previous_version: u64,
    latest_version: u64,
    installed_version: u64,
    forced: bool,
    bytes_downloaded: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction: Option<ExtractionOutput>,
    duration_ms: u128,
}

impl From<&UpdateReport> for UpdateOutput {
    fn from(report: &UpdateReport) -> Self {
        Self {
            outcome: match report.outcome {
                UpdateOutcome::UpToDate => "up_to_date",
                UpdateOutcome::Updated => "updated",
            },
            previous_version: report.previous_version,
            latest_version: report.latest_version,
            installed_version: report.installed_version(),
            forced: report.forced,
            bytes_downloaded: report.bytes_downloaded,
            digest: report.digest.clone(),
            extraction: report.extraction.as_ref().map(|e| ExtractionOutput {
                files_extracted: e.files_extracted,
                directories_created: e.directories_created,
                links_created: e.links_created,
                bytes_written: e.bytes_written,
                duration_ms: e.duration.as_millis(),
            }),
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_update_result(&self, report: &UpdateReport) -> Result<()> {
        Self::output(&JsonOutput::success("update", UpdateOutput::from(report)))
    }

    fn format_check_result(&self, check: &VersionCheck) -> Result<()> {
        #[derive(Serialize)]
        struct CheckOutput {
            current_version: u64,
            latest_version: u64,
            update_available: bool,
        }

        let data = CheckOutput {
            current_version: check.current,
            latest_version: check.latest,
            update_available: check.update_available(),
        };

        Self::output(&JsonOutput::success("check", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
