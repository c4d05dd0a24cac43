//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use pakfile_core::CreationReport;
use pakfile_core::DirectoryEntry;
use pakfile_core::DuplicateRecord;
use pakfile_core::ExtractionReport;
use std::path::Path;

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

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn heading(&self, ok: bool, message: &str) {
        let line = match (self.use_colors, ok) {
            (true, true) => format!("{} {message}", style("✓").green().bold()),
            (true, false) => format!("{} {message}", style("⚠").yellow().bold()),
            (false, _) => message.to_string(),
        };
        let _ = self.term.write_line(&line);
    }

    fn dry_run_suffix(dry_run: bool) -> &'static str {
        if dry_run { " (dry run)" } else { "" }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, archive: &Path, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let suffix = Self::dry_run_suffix(report.dry_run);
        if report.has_errors() {
            self.heading(
                false,
                &format!("Extracted {} with errors{suffix}", archive.display()),
            );
        } else {
            self.heading(true, &format!("Extraction complete{suffix}"));
        }

        let _ = self.term.write_line(&format!(
            "  Files extracted:   {}",
            Self::format_number(report.files_extracted)
        ));
        if report.files_overwritten > 0 {
            let _ = self.term.write_line(&format!(
                "  Files overwritten: {}",
                Self::format_number(report.files_overwritten)
            ));
        }
        if report.files_skipped > 0 {
            let _ = self.term.write_line(&format!(
                "  Files skipped:     {}",
                Self::format_number(report.files_skipped)
            ));
        }
        if report.errors > 0 {
            let _ = self.term.write_line(&format!(
                "  Errors:            {}",
                Self::format_number(report.errors)
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Total size:        {}",
            Self::format_size(report.bytes_written)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_creation_result(&self, archive: &Path, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.heading(
            true,
            &format!(
                "Archive created: {}{}",
                archive.display(),
                Self::dry_run_suffix(report.dry_run)
            ),
        );

        if self.verbose {
            for entry in &report.entries {
                let _ = self.term.write_line(&format!("  + {}", entry.path));
            }
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added())
        ));
        if report.files_filtered > 0 {
            let _ = self.term.write_line(&format!(
                "  Files filtered:   {}",
                Self::format_number(report.files_filtered)
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_size)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_entries(
        &self,
        _archive: &Path,
        entries: &[DirectoryEntry],
        long: bool,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if !long {
            for entry in entries {
                let _ = self.term.write_line(&entry.path);
            }
            return Ok(());
        }

        for entry in entries {
            let _ = self.term.write_line(&format!(
                "{:>10} {:>10}  {}",
                entry.offset, entry.size, entry.path
            ));
        }

        let total: u64 = entries.iter().map(|e| u64::from(e.size)).sum();
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} files, {}",
            Self::format_number(entries.len()),
            Self::format_size(total)
        ));

        Ok(())
    }

    fn format_duplicates(&self, records: &[DuplicateRecord]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for record in records {
            let _ = self.term.write_line(&record.to_string());
        }

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "{} duplicate paths",
                Self::format_number(records.len())
            ));
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("WARNING: {message}"));
        }
    }
}
