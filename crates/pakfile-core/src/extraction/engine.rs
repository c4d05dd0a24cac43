//! Core extraction engine.

use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::info;

use super::conflict::ConflictDecision;
use super::conflict::Destination;
use super::conflict::OverwritePrompt;
use super::conflict::PlannedTree;
use super::conflict::inspect;
use super::conflict::resolve_overwrite;
use super::path::destination_for;
use crate::PakArchive;
use crate::PakConfig;
use crate::PakError;
use crate::Result;
use crate::error::ConflictKind;
use crate::formats::DirectoryEntry;
use crate::report::EntryOutcome;
use crate::report::EntryRecord;
use crate::report::ExtractionReport;
use crate::report::ProgressCallback;

/// Extracts the selected entries of one archive, entry by entry.
///
/// The overwrite decision lives here for the length of one run, so an
/// `all`/`none` answer carries over to every later conflict.
pub struct Extractor<'a> {
    config: &'a PakConfig,
    prompt: &'a mut dyn OverwritePrompt,
    progress: &'a mut dyn ProgressCallback,
    decision: ConflictDecision,
    planned: PlannedTree,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor starting from `config.on_conflict`.
    ///
    /// Only the latching decisions `All` and `None` bypass the prompt; a
    /// preset `Yes` or `No` behaves like `Unset`.
    pub fn new(
        config: &'a PakConfig,
        prompt: &'a mut dyn OverwritePrompt,
        progress: &'a mut dyn ProgressCallback,
    ) -> Self {
        let decision = if config.on_conflict.is_sticky() {
            config.on_conflict
        } else {
            ConflictDecision::Unset
        };
        Self {
            config,
            prompt,
            progress,
            decision,
            planned: PlannedTree::default(),
        }
    }

    /// Current overwrite decision.
    #[must_use]
    pub const fn decision(&self) -> ConflictDecision {
        self.decision
    }

    /// Extracts every selected entry of `archive` below `root`.
    ///
    /// Conflicts and unsafe entry paths become error outcomes and the run
    /// continues. Everything else aborts it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - `root` exists but is not a directory
    /// - The table or an entry body cannot be read
    /// - A destination file cannot be written
    /// - The overwrite prompt closes
    pub fn extract(&mut self, archive: &mut PakArchive, root: &Path) -> Result<ExtractionReport> {
        let start = Instant::now();
        self.config.validate()?;
        let filter = self.config.compile_filter()?;

        prepare_root(root, self.config.dry_run)?;
        self.planned = PlannedTree::default();

        let entries = archive.list(filter.as_ref(), self.config.case_fold)?;
        let total = entries.len();
        info!(
            archive = %archive.path().display(),
            root = %root.display(),
            total,
            dry_run = self.config.dry_run,
            "extracting"
        );

        let mut report = ExtractionReport {
            dry_run: self.config.dry_run,
            ..ExtractionReport::default()
        };
        for (index, entry) in entries.iter().enumerate() {
            self.progress.on_entry_start(&entry.path, total, index + 1);
            let record = self.extract_entry(archive, root, entry)?;
            self.progress.on_entry_complete(&record);
            report.record(record);
        }

        report.duration = start.elapsed();
        self.progress.on_complete();
        Ok(report)
    }

    fn extract_entry(
        &mut self,
        archive: &mut PakArchive,
        root: &Path,
        entry: &DirectoryEntry,
    ) -> Result<EntryRecord> {
        let dest = match destination_for(root, &entry.path) {
            Ok(dest) => dest,
            Err(err) if err.is_entry_level() => {
                return Ok(refused(entry, PathBuf::new(), &err));
            }
            Err(err) => return Err(err),
        };

        let overwrite = match inspect(&dest, &self.planned) {
            Destination::Vacant => false,
            Destination::ExistingFile => {
                if !resolve_overwrite(&mut self.decision, self.prompt, &dest)? {
                    debug!(entry = %entry.path, "keeping existing file");
                    return Ok(EntryRecord {
                        path: entry.path.clone(),
                        destination: dest,
                        outcome: EntryOutcome::Skipped,
                        bytes: 0,
                    });
                }
                true
            }
            Destination::ExistingDirectory => {
                return Ok(conflict(entry, dest, ConflictKind::FileIsDirectory));
            }
            Destination::BlockedBy(ancestor) => {
                return Ok(conflict(
                    entry,
                    dest,
                    ConflictKind::AncestorIsFile { ancestor },
                ));
            }
            Destination::Unreadable { path, reason } => {
                return Ok(conflict(
                    entry,
                    dest,
                    ConflictKind::Unreadable { path, reason },
                ));
            }
        };

        let bytes = if self.config.dry_run {
            self.planned.record_file(root, &dest);
            0
        } else {
            self.write_entry(archive, entry, &dest, overwrite)?
        };
        debug!(entry = %entry.path, dest = %dest.display(), bytes, overwrite, "entry done");

        Ok(EntryRecord {
            path: entry.path.clone(),
            destination: dest,
            outcome: if overwrite {
                EntryOutcome::Overwrote
            } else {
                EntryOutcome::Extracted
            },
            bytes,
        })
    }

    fn write_entry(
        &mut self,
        archive: &mut PakArchive,
        entry: &DirectoryEntry,
        dest: &Path,
        overwrite: bool,
    ) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut writer = BufWriter::new(options.open(dest)?);

        let mut written = 0u64;
        for chunk in archive.stream_bytes(entry, self.config.chunk_size)? {
            let chunk = chunk?;
            writer.write_all(&chunk)?;
            written += chunk.len() as u64;
            self.progress.on_bytes_written(chunk.len() as u64);
        }
        writer.flush()?;
        Ok(written)
    }
}

fn prepare_root(root: &Path, dry_run: bool) -> Result<()> {
    match std::fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PakError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if !dry_run {
                std::fs::create_dir_all(root)?;
            }
            Ok(())
        }
        Err(e) => Err(PakError::Io(e)),
    }
}

fn conflict(entry: &DirectoryEntry, dest: PathBuf, kind: ConflictKind) -> EntryRecord {
    let err = PakError::DestinationConflict {
        path: dest.clone(),
        kind,
    };
    debug!(entry = %entry.path, "{err}");
    refused(entry, dest, &err)
}

fn refused(entry: &DirectoryEntry, dest: PathBuf, err: &PakError) -> EntryRecord {
    EntryRecord {
        path: entry.path.clone(),
        destination: dest,
        outcome: EntryOutcome::Error {
            cause: err.to_string(),
            conflict: err.conflict_kind().cloned(),
        },
        bytes: 0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::report::NoopProgress;
    use crate::test_utils::build_pak_raw;
    use crate::test_utils::raw_record;
    use crate::test_utils::write_pak;
    use std::io;
    use tempfile::TempDir;

    struct NeverAsked;

    impl OverwritePrompt for NeverAsked {
        fn ask(&mut self, path: &Path) -> io::Result<Option<String>> {
            panic!("unexpected prompt for {}", path.display());
        }
    }

    struct Answer(&'static str);

    impl OverwritePrompt for Answer {
        fn ask(&mut self, _path: &Path) -> io::Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    fn run(
        archive: &Path,
        root: &Path,
        config: &PakConfig,
        prompt: &mut dyn OverwritePrompt,
    ) -> Result<ExtractionReport> {
        let mut pak = PakArchive::open(archive).unwrap();
        let mut progress = NoopProgress;
        Extractor::new(config, prompt, &mut progress).extract(&mut pak, root)
    }

    fn outcomes(report: &ExtractionReport) -> Vec<(&str, &str)> {
        report
            .entries
            .iter()
            .map(|r| (r.path.as_str(), r.outcome.label()))
            .collect()
    }

    #[test]
    fn test_extract_fresh_tree() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(
            temp.path(),
            "pak0.pak",
            &[("progs.dat", b"qc"), ("maps/e1m1.bsp", b"bsp!")],
        );
        let out = temp.path().join("out");

        let report = run(&pak, &out, &PakConfig::default(), &mut NeverAsked).unwrap();

        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.bytes_written, 6);
        assert_eq!(std::fs::read(out.join("progs.dat")).unwrap(), b"qc");
        assert_eq!(std::fs::read(out.join("maps/e1m1.bsp")).unwrap(), b"bsp!");
    }

    #[test]
    fn test_small_chunks_write_whole_body() {
        let temp = TempDir::new().unwrap();
        let data: Vec<u8> = (0..=255).cycle().take(5000).collect();
        let pak = write_pak(temp.path(), "pak0.pak", &[("gfx.wad", &data)]);
        let out = temp.path().join("out");
        let config = PakConfig::default().with_chunk_size(7);

        run(&pak, &out, &config, &mut NeverAsked).unwrap();
        assert_eq!(std::fs::read(out.join("gfx.wad")).unwrap(), data);
    }

    #[test]
    fn test_directory_in_the_way() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("maps", b"x"), ("end", b"y")]);
        let out = temp.path().join("out");
        std::fs::create_dir_all(out.join("maps")).unwrap();

        let report = run(&pak, &out, &PakConfig::default(), &mut NeverAsked).unwrap();

        assert_eq!(outcomes(&report), [("maps", "error"), ("end", "extracted")]);
        assert_eq!(
            report.entries[0].outcome,
            EntryOutcome::Error {
                cause: format!(
                    "cannot extract {}: destination is a directory",
                    out.join("maps").display()
                ),
                conflict: Some(ConflictKind::FileIsDirectory),
            }
        );
        assert!(out.join("maps").is_dir());
    }

    #[test]
    fn test_file_in_place_of_ancestor() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("sound/doors/d1.wav", b"x")]);
        let out = temp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("sound"), b"file").unwrap();

        let report = run(&pak, &out, &PakConfig::default(), &mut NeverAsked).unwrap();

        let record = &report.entries[0];
        assert!(matches!(
            &record.outcome,
            EntryOutcome::Error {
                conflict: Some(ConflictKind::AncestorIsFile { ancestor }),
                ..
            } if *ancestor == out.join("sound")
        ));
        assert_eq!(std::fs::read(out.join("sound")).unwrap(), b"file");
    }

    #[test]
    fn test_earlier_entry_blocks_later_one() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("maps", b"x"), ("maps/a.bsp", b"y")]);
        let out = temp.path().join("out");

        let report = run(&pak, &out, &PakConfig::default(), &mut NeverAsked).unwrap();
        assert_eq!(outcomes(&report), [("maps", "extracted"), ("maps/a.bsp", "error")]);
    }

    #[test]
    fn test_existing_file_prompt_yes_and_no() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("progs.dat", b"new")]);
        let out = temp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("progs.dat"), b"old contents").unwrap();

        let report = run(&pak, &out, &PakConfig::default(), &mut Answer("n")).unwrap();
        assert_eq!(outcomes(&report), [("progs.dat", "skipped")]);
        assert_eq!(std::fs::read(out.join("progs.dat")).unwrap(), b"old contents");

        let report = run(&pak, &out, &PakConfig::default(), &mut Answer("y")).unwrap();
        assert_eq!(outcomes(&report), [("progs.dat", "overwrote")]);
        assert_eq!(std::fs::read(out.join("progs.dat")).unwrap(), b"new");
    }

    #[test]
    fn test_preset_all_skips_prompt() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("a", b"1"), ("b", b"2")]);
        let out = temp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("a"), b"old").unwrap();
        std::fs::write(out.join("b"), b"old").unwrap();

        let config = PakConfig::default().with_on_conflict(ConflictDecision::All);
        let report = run(&pak, &out, &config, &mut NeverAsked).unwrap();
        assert_eq!(report.files_overwritten, 2);

        let config = PakConfig::default().with_on_conflict(ConflictDecision::None);
        let report = run(&pak, &out, &config, &mut NeverAsked).unwrap();
        assert_eq!(report.files_skipped, 2);
    }

    #[test]
    fn test_prompt_closed_aborts() {
        struct Closed;

        impl OverwritePrompt for Closed {
            fn ask(&mut self, _path: &Path) -> io::Result<Option<String>> {
                Ok(None)
            }
        }

        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("a", b"1")]);
        let out = temp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("a"), b"old").unwrap();

        let result = run(&pak, &out, &PakConfig::default(), &mut Closed);
        assert!(matches!(result, Err(PakError::PromptClosed)));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("maps/e1m1.bsp", b"x"), ("b", b"y")]);
        let out = temp.path().join("out");
        let config = PakConfig::default().with_dry_run(true);

        let report = run(&pak, &out, &config, &mut NeverAsked).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.bytes_written, 0);
        assert!(!out.exists());
    }

    #[test]
    fn test_dry_run_sees_earlier_entries() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(
            temp.path(),
            "pak0.pak",
            &[
                ("maps", b"x"),
                ("maps/a.bsp", b"y"),
                ("progs.dat", b"1"),
                ("progs.dat", b"2"),
            ],
        );

        let dry_out = temp.path().join("dry");
        let config = PakConfig::default().with_dry_run(true);
        let dry = run(&pak, &dry_out, &config, &mut Answer("n")).unwrap();

        let real_out = temp.path().join("real");
        let real = run(&pak, &real_out, &PakConfig::default(), &mut Answer("n")).unwrap();

        let expected = [
            ("maps", "extracted"),
            ("maps/a.bsp", "error"),
            ("progs.dat", "extracted"),
            ("progs.dat", "skipped"),
        ];
        assert_eq!(outcomes(&real), expected);
        assert_eq!(outcomes(&dry), expected);
        assert!(matches!(
            &dry.entries[1].outcome,
            EntryOutcome::Error {
                conflict: Some(ConflictKind::AncestorIsFile { ancestor }),
                ..
            } if *ancestor == dry_out.join("maps")
        ));
        assert!(!dry_out.exists());
    }

    #[test]
    fn test_dry_run_still_prompts() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("a", b"new")]);
        let out = temp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("a"), b"old").unwrap();
        let config = PakConfig::default().with_dry_run(true);

        let report = run(&pak, &out, &config, &mut Answer("yes")).unwrap();
        assert_eq!(outcomes(&report), [("a", "overwrote")]);
        assert_eq!(std::fs::read(out.join("a")).unwrap(), b"old");
    }

    #[test]
    fn test_unsafe_entry_refused() {
        let temp = TempDir::new().unwrap();
        let records = [
            raw_record(b"../escape.txt", 12, 1),
            raw_record(b"ok.txt", 13, 1),
        ];
        let path = temp.path().join("evil.pak");
        std::fs::write(&path, build_pak_raw(&[b"x", b"y"], &records)).unwrap();
        let out = temp.path().join("out");

        let report = run(&path, &out, &PakConfig::default(), &mut NeverAsked).unwrap();

        assert_eq!(
            outcomes(&report),
            [("../escape.txt", "error"), ("ok.txt", "extracted")]
        );
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_root_is_file() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(temp.path(), "pak0.pak", &[("a", b"1")]);
        let out = temp.path().join("out");
        std::fs::write(&out, b"").unwrap();

        let result = run(&pak, &out, &PakConfig::default(), &mut NeverAsked);
        assert!(matches!(result, Err(PakError::NotADirectory { .. })));
    }

    #[test]
    fn test_filter_and_fold() {
        let temp = TempDir::new().unwrap();
        let pak = write_pak(
            temp.path(),
            "pak0.pak",
            &[("Maps/E1M1.bsp", b"x"), ("progs.dat", b"y")],
        );
        let out = temp.path().join("out");
        let config = PakConfig::default()
            .with_case_fold(true)
            .with_path_filter("^maps/");

        let report = run(&pak, &out, &config, &mut NeverAsked).unwrap();
        assert_eq!(outcomes(&report), [("maps/e1m1.bsp", "extracted")]);
        assert!(out.join("maps/e1m1.bsp").is_file());
        assert!(!out.join("progs.dat").exists());
    }

    #[test]
    fn test_truncated_body_is_fatal() {
        let temp = TempDir::new().unwrap();
        let records = [raw_record(b"big.bin", 12, 1000)];
        let path = temp.path().join("cut.pak");
        std::fs::write(&path, build_pak_raw(&[b"tiny"], &records)).unwrap();

        let result = run(&path, &temp.path().join("out"), &PakConfig::default(), &mut NeverAsked);
        assert!(matches!(result, Err(PakError::TruncatedArchive { .. })));
    }
}
