//! Archive creation operation reporting.

use std::time::Duration;

use crate::formats::DirectoryEntry;

/// Report of an archive creation operation.
///
/// # Examples
///
/// ```
/// use pakfile_core::creation::CreationReport;
///
/// let report = CreationReport::new();
/// assert_eq!(report.files_added(), 0);
/// assert_eq!(report.archive_size, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Entries written, in table order.
    pub entries: Vec<DirectoryEntry>,

    /// Files under the root left out by the path filter.
    pub files_filtered: usize,

    /// Total body bytes written.
    pub bytes_written: u64,

    /// Size of the finished archive including header and table.
    pub archive_size: u64,

    /// Whether the bytes were discarded.
    pub dry_run: bool,

    /// Duration of the creation operation.
    pub duration: Duration,
}

impl CreationReport {
    /// Creates a new empty creation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files added to the archive.
    #[must_use]
    pub fn files_added(&self) -> usize {
        self.entries.len()
    }
}
