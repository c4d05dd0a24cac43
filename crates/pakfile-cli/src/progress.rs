//! Per-entry extraction output.

use pakfile_core::EntryRecord;
use pakfile_core::ProgressCallback;
use std::io::Stderr;
use std::io::Stdout;
use std::io::Write;

/// Prints one line per entry outcome as extraction proceeds.
///
/// Outcome lines go to `out` unless `quiet` is set. Error lines always go to
/// `err`, followed by the `skipping` line for the same entry.
pub struct EntryPrinter<O: Write + Send, E: Write + Send> {
    out: O,
    err: E,
    quiet: bool,
}

impl EntryPrinter<Stdout, Stderr> {
    /// Printer over the process's standard streams.
    #[must_use]
    pub fn stdio(quiet: bool) -> Self {
        Self::new(std::io::stdout(), std::io::stderr(), quiet)
    }
}

impl<O: Write + Send, E: Write + Send> EntryPrinter<O, E> {
    #[must_use]
    pub const fn new(out: O, err: E, quiet: bool) -> Self {
        Self { out, err, quiet }
    }

    #[cfg(test)]
    fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write + Send, E: Write + Send> ProgressCallback for EntryPrinter<O, E> {
    fn on_entry_start(&mut self, _path: &str, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, record: &EntryRecord) {
        // A closed pipe must not abort extraction.
        if record.outcome.is_error() {
            for line in record.report_lines() {
                let _ = writeln!(self.err, "{line}");
            }
        } else if !self.quiet {
            for line in record.report_lines() {
                let _ = writeln!(self.out, "{line}");
            }
        }
    }

    fn on_complete(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakfile_core::EntryOutcome;
    use std::path::PathBuf;

    fn record(path: &str, outcome: EntryOutcome) -> EntryRecord {
        EntryRecord {
            path: path.to_string(),
            destination: PathBuf::from("out").join(path),
            outcome,
            bytes: 0,
        }
    }

    fn failed(path: &str) -> EntryRecord {
        record(
            path,
            EntryOutcome::Error {
                cause: format!("cannot extract out/{path}: destination is a directory"),
                conflict: None,
            },
        )
    }

    #[test]
    fn test_outcome_lines() {
        let mut printer = EntryPrinter::new(Vec::new(), Vec::new(), false);
        printer.on_entry_complete(&record("progs.dat", EntryOutcome::Extracted));
        printer.on_entry_complete(&failed("maps"));
        printer.on_complete();

        let (out, err) = printer.into_parts();
        let out = String::from_utf8(out).unwrap_or_default();
        let err = String::from_utf8(err).unwrap_or_default();
        assert!(out.contains("progs.dat"));
        assert!(!out.contains("maps"));
        assert!(err.contains("destination is a directory"));
        assert!(err.contains("skipping maps"));
    }

    #[test]
    fn test_quiet_keeps_errors() {
        let mut printer = EntryPrinter::new(Vec::new(), Vec::new(), true);
        printer.on_entry_complete(&record("progs.dat", EntryOutcome::Skipped));
        printer.on_entry_complete(&failed("maps"));

        let (out, err) = printer.into_parts();
        assert!(out.is_empty());
        assert!(!err.is_empty());
    }
}
