//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use pakfile_core::CreationReport;
use pakfile_core::DirectoryEntry;
use pakfile_core::DuplicateRecord;
use pakfile_core::ExtractionReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct EntryData {
    path: String,
    offset: u32,
    size: u32,
}

impl From<&DirectoryEntry> for EntryData {
    fn from(entry: &DirectoryEntry) -> Self {
        Self {
            path: entry.path.clone(),
            offset: entry.offset,
            size: entry.size,
        }
    }
}

#[derive(Debug, Serialize)]
struct OutcomeData {
    path: String,
    destination: String,
    outcome: &'static str,
    bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DuplicateData {
    path: String,
    archives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<String>,
}

impl From<&DuplicateRecord> for DuplicateData {
    fn from(record: &DuplicateRecord) -> Self {
        Self {
            path: record.path.clone(),
            archives: record
                .archives()
                .map(|p| p.display().to_string())
                .collect(),
            checksum: record.checksum.map(|crc| format!("{crc:08x}")),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, archive: &Path, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            archive: String,
            files_extracted: usize,
            files_overwritten: usize,
            files_skipped: usize,
            errors: usize,
            bytes_written: u64,
            dry_run: bool,
            duration_ms: u128,
            entries: Vec<OutcomeData>,
        }

        let data = ExtractionOutput {
            archive: archive.display().to_string(),
            files_extracted: report.files_extracted,
            files_overwritten: report.files_overwritten,
            files_skipped: report.files_skipped,
            errors: report.errors,
            bytes_written: report.bytes_written,
            dry_run: report.dry_run,
            duration_ms: report.duration.as_millis(),
            entries: report
                .entries
                .iter()
                .map(|record| OutcomeData {
                    path: record.path.clone(),
                    destination: record.destination.display().to_string(),
                    outcome: record.outcome.label(),
                    bytes: record.bytes,
                    error: match &record.outcome {
                        pakfile_core::EntryOutcome::Error { cause, .. } => Some(cause.clone()),
                        _ => None,
                    },
                })
                .collect(),
        };

        if report.has_errors() {
            let message = format!("{} entries could not be extracted", report.errors);
            Self::output(&JsonOutput::partial("extract", data, message))
        } else {
            Self::output(&JsonOutput::success("extract", data))
        }
    }

    fn format_creation_result(&self, archive: &Path, report: &CreationReport) -> Result<()> {
        #[derive(Serialize)]
        struct CreationOutput {
            output_path: String,
            files_added: usize,
            files_filtered: usize,
            bytes_written: u64,
            archive_size: u64,
            dry_run: bool,
            duration_ms: u128,
            entries: Vec<EntryData>,
        }

        let data = CreationOutput {
            output_path: archive.display().to_string(),
            files_added: report.files_added(),
            files_filtered: report.files_filtered,
            bytes_written: report.bytes_written,
            archive_size: report.archive_size,
            dry_run: report.dry_run,
            duration_ms: report.duration.as_millis(),
            entries: report.entries.iter().map(EntryData::from).collect(),
        };

        Self::output(&JsonOutput::success("create", data))
    }

    fn format_entries(
        &self,
        archive: &Path,
        entries: &[DirectoryEntry],
        _long: bool,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput {
            archive: String,
            total_entries: usize,
            total_size: u64,
            entries: Vec<EntryData>,
        }

        let data = ListOutput {
            archive: archive.display().to_string(),
            total_entries: entries.len(),
            total_size: entries.iter().map(|e| u64::from(e.size)).sum(),
            entries: entries.iter().map(EntryData::from).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_duplicates(&self, records: &[DuplicateRecord]) -> Result<()> {
        let data: Vec<DuplicateData> = records.iter().map(DuplicateData::from).collect();
        Self::output(&JsonOutput::success("dupes", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        // Warnings go to stderr so stdout holds exactly one document.
        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        if let Ok(json) = serde_json::to_string(&output) {
            let _ = writeln!(io::stderr(), "{json}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pakfile_core::DuplicateOwner;
    use std::path::PathBuf;

    #[test]
    fn test_duplicate_data_shape() {
        let record = DuplicateRecord {
            path: "progs.dat".to_string(),
            owners: vec![
                DuplicateOwner {
                    archive: PathBuf::from("id1/pak1.pak"),
                    entry: DirectoryEntry::new("progs.dat", 12, 3),
                },
                DuplicateOwner {
                    archive: PathBuf::from("id1/pak0.pak"),
                    entry: DirectoryEntry::new("progs.dat", 40, 3),
                },
            ],
            checksum: Some(0xab),
        };

        let value = serde_json::to_value(DuplicateData::from(&record)).unwrap();
        assert_eq!(value["path"], "progs.dat");
        assert_eq!(value["archives"][0], "id1/pak1.pak");
        assert_eq!(value["archives"][1], "id1/pak0.pak");
        assert_eq!(value["checksum"], "000000ab");
    }

    #[test]
    fn test_status_serialization() {
        let output = JsonOutput::partial("extract", 1, "1 entries could not be extracted");
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["status"], "partial");
        assert_eq!(value["data"], 1);

        let value = serde_json::to_value(JsonOutput::<()>::error("list", "boom")).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value.get("data").is_none());
    }
}
