//! Output formatter trait for CLI results.

use anyhow::Result;
use pakfile_core::CreationReport;
use pakfile_core::DirectoryEntry;
use pakfile_core::DuplicateRecord;
use pakfile_core::ExtractionReport;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format extraction result
    fn format_extraction_result(&self, archive: &Path, report: &ExtractionReport) -> Result<()>;

    /// Format creation result
    fn format_creation_result(&self, archive: &Path, report: &CreationReport) -> Result<()>;

    /// Format the directory table of an archive
    fn format_entries(&self, archive: &Path, entries: &[DirectoryEntry], long: bool)
    -> Result<()>;

    /// Format duplicate paths found across archives
    fn format_duplicates(&self, records: &[DuplicateRecord]) -> Result<()>;

    /// Format the error that ended `operation`
    fn format_error(&self, operation: &str, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    /// At least one entry failed but the operation ran to the end.
    Partial,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn partial(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Partial,
            data: Some(data),
            error: Some(error.into()),
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
