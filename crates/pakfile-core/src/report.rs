//! Extraction operation reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConflictKind;

/// What happened to one archive entry during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Written to a previously vacant destination.
    Extracted,
    /// Replaced an existing file after an overwrite decision.
    Overwrote,
    /// Left alone because the overwrite decision said no.
    Skipped,
    /// Not written because of a per-entry error.
    Error {
        /// Human-readable cause.
        cause: String,
        /// Set when the cause is a destination conflict.
        conflict: Option<ConflictKind>,
    },
}

impl EntryOutcome {
    /// Short label used in listings and JSON output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Extracted => "extracted",
            Self::Overwrote => "overwrote",
            Self::Skipped => "skipped",
            Self::Error { .. } => "error",
        }
    }

    /// Returns `true` for the [`EntryOutcome::Error`] variant.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Outcome of one entry, as delivered to [`ProgressCallback`] and kept in
/// [`ExtractionReport::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Entry path as stored in the archive (folded if requested).
    pub path: String,
    /// Destination on disk; empty when the entry path was refused.
    pub destination: PathBuf,
    /// What happened.
    pub outcome: EntryOutcome,
    /// Body bytes written (zero in dry-run and for non-writes).
    pub bytes: u64,
}

impl EntryRecord {
    /// Renders the record as report lines.
    ///
    /// Successful outcomes take one line. Errors take two: the cause, then
    /// `skipping <path>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakfile_core::EntryOutcome;
    /// use pakfile_core::EntryRecord;
    ///
    /// let record = EntryRecord {
    ///     path: "maps/e1m1.bsp".to_string(),
    ///     destination: "out/maps/e1m1.bsp".into(),
    ///     outcome: EntryOutcome::Extracted,
    ///     bytes: 10,
    /// };
    /// assert_eq!(record.report_lines(), ["extracted maps/e1m1.bsp"]);
    /// ```
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        match &self.outcome {
            EntryOutcome::Error { cause, .. } => {
                vec![cause.clone(), format!("skipping {}", self.path)]
            }
            outcome => vec![format!("{} {}", outcome.label(), self.path)],
        }
    }
}

/// Report of an archive extraction operation.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Entries written to vacant destinations.
    pub files_extracted: usize,

    /// Entries that replaced existing files.
    pub files_overwritten: usize,

    /// Entries skipped by an overwrite decision.
    pub files_skipped: usize,

    /// Entries refused by a conflict or an unsafe path.
    pub errors: usize,

    /// Total body bytes written to disk.
    pub bytes_written: u64,

    /// Whether nothing was written.
    pub dry_run: bool,

    /// Duration of the extraction operation.
    pub duration: Duration,

    /// One record per selected entry, in table order.
    pub entries: Vec<EntryRecord>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one entry record into the counters and keeps it.
    pub fn record(&mut self, record: EntryRecord) {
        match record.outcome {
            EntryOutcome::Extracted => self.files_extracted += 1,
            EntryOutcome::Overwrote => self.files_overwritten += 1,
            EntryOutcome::Skipped => self.files_skipped += 1,
            EntryOutcome::Error { .. } => self.errors += 1,
        }
        self.bytes_written += record.bytes;
        self.entries.push(record);
    }

    /// Returns total number of entries processed.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether any entry ended in an error outcome.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Callback trait for progress reporting during extraction.
///
/// Every selected entry gets exactly one `on_entry_start` and one
/// `on_entry_complete`, in table order.
///
/// # Examples
///
/// ```
/// use pakfile_core::EntryRecord;
/// use pakfile_core::ProgressCallback;
///
/// struct LinePrinter;
///
/// impl ProgressCallback for LinePrinter {
///     fn on_entry_start(&mut self, _path: &str, _total: usize, _current: usize) {}
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, record: &EntryRecord) {
///         for line in record.report_lines() {
///             println!("{line}");
///         }
///     }
///
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called when starting to process an entry.
    ///
    /// # Arguments
    ///
    /// * `path` - Entry path (folded if requested)
    /// * `total` - Number of selected entries
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, path: &str, total: usize, current: usize);

    /// Called after each chunk written to disk.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called once the entry's outcome is known.
    fn on_entry_complete(&mut self, record: &EntryRecord);

    /// Called when the entire operation is complete.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback` that does nothing.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &str, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _record: &EntryRecord) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, outcome: EntryOutcome, bytes: u64) -> EntryRecord {
        EntryRecord {
            path: path.to_string(),
            destination: PathBuf::from("out").join(path),
            outcome,
            bytes,
        }
    }

    #[test]
    fn test_new_report() {
        let report = ExtractionReport::new();
        assert_eq!(report.files_extracted, 0);
        assert_eq!(report.bytes_written, 0);
        assert!(!report.has_errors());
        assert_eq!(report.total_items(), 0);
    }

    #[test]
    fn test_record_counts() {
        let mut report = ExtractionReport::new();
        report.record(record("a", EntryOutcome::Extracted, 10));
        report.record(record("b", EntryOutcome::Overwrote, 5));
        report.record(record("c", EntryOutcome::Skipped, 0));
        report.record(record(
            "d",
            EntryOutcome::Error {
                cause: "boom".to_string(),
                conflict: None,
            },
            0,
        ));

        assert_eq!(report.files_extracted, 1);
        assert_eq!(report.files_overwritten, 1);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.bytes_written, 15);
        assert_eq!(report.total_items(), 4);
        assert!(report.has_errors());
    }

    #[test]
    fn test_report_lines() {
        assert_eq!(
            record("gfx.wad", EntryOutcome::Overwrote, 1).report_lines(),
            ["overwrote gfx.wad"]
        );
        assert_eq!(
            record("gfx.wad", EntryOutcome::Skipped, 0).report_lines(),
            ["skipped gfx.wad"]
        );

        let conflict = record(
            "maps",
            EntryOutcome::Error {
                cause: "cannot extract out/maps: destination is a directory".to_string(),
                conflict: Some(ConflictKind::FileIsDirectory),
            },
            0,
        );
        assert_eq!(
            conflict.report_lines(),
            [
                "cannot extract out/maps: destination is a directory",
                "skipping maps"
            ]
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(EntryOutcome::Extracted.label(), "extracted");
        assert!(!EntryOutcome::Skipped.is_error());
        assert!(
            EntryOutcome::Error {
                cause: String::new(),
                conflict: None
            }
            .is_error()
        );
    }
}
