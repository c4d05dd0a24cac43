//! Building an archive from a directory tree.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::report::CreationReport;
use super::walker::SourceWalker;
use super::writer::PakWriter;
use crate::PakConfig;
use crate::PakError;
use crate::Result;
use crate::formats::ArchiveHeader;

/// Creates `dest` from every regular file under `root`.
///
/// Files are added in walk order (sorted by name at each level). The tree
/// is listed before `dest` is created, so a destination under `root` never
/// ends up inside itself.
///
/// # Errors
///
/// Same as [`create_pak_from`], plus walk errors.
pub fn create_pak(root: &Path, dest: &Path, config: &PakConfig) -> Result<CreationReport> {
    config.validate()?;
    check_root(root)?;
    check_destination(dest)?;

    let files = SourceWalker::new(root).collect_files()?;
    debug!(root = %root.display(), files = files.len(), "walked source tree");

    create_pak_from(root, files.iter().map(|f| f.relative.as_str()), dest, config)
}

/// Creates `dest` from the given paths, relative to `root`, in order.
///
/// Each path is canonicalized to `/`-separated form. The path filter is
/// matched against that form; folding then lower-cases the stored path.
/// Dry-run performs every check but discards the bytes and creates no file.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - `root` is missing or not a directory
/// - `dest` already exists (`DestinationExists`, checked in dry-run too)
/// - A path escapes `root` (`UnsafePath`)
/// - A path collides case-insensitively, is too long or is not ASCII
/// - A source file changes size while being read
/// - The archive would exceed the 32-bit offset range
///
/// A real run that fails part way removes the partial archive on a
/// best-effort basis.
pub fn create_pak_from<I, S>(
    root: &Path,
    paths: I,
    dest: &Path,
    config: &PakConfig,
) -> Result<CreationReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start = Instant::now();
    config.validate()?;
    let filter = config.compile_filter()?;
    check_root(root)?;
    check_destination(dest)?;

    let mut report = CreationReport {
        dry_run: config.dry_run,
        ..CreationReport::default()
    };

    let mut selected = Vec::new();
    for path in paths {
        let relative = canonical_relative(path.as_ref())?;
        if filter.as_ref().is_none_or(|f| f.matches(&relative)) {
            selected.push(relative);
        } else {
            report.files_filtered += 1;
        }
    }

    let header = if config.dry_run {
        let mut writer = PakWriter::new(std::io::empty(), config.chunk_size)?;
        add_all(&mut writer, root, &selected, config)?;
        report.entries = writer.entries().to_vec();
        writer.finish()?.1
    } else {
        let file = File::create_new(dest).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                PakError::DestinationExists {
                    path: dest.to_path_buf(),
                }
            } else {
                PakError::Io(e)
            }
        })?;
        let written = PakWriter::new(BufWriter::new(file), config.chunk_size).and_then(|mut writer| {
            add_all(&mut writer, root, &selected, config)?;
            report.entries = writer.entries().to_vec();
            writer.finish()
        });
        match written {
            Ok((_, header)) => header,
            Err(err) => {
                if let Err(e) = std::fs::remove_file(dest) {
                    warn!(archive = %dest.display(), "cannot remove partial archive: {e}");
                }
                return Err(err);
            }
        }
    };

    report.bytes_written = report.entries.iter().map(|e| u64::from(e.size)).sum();
    report.archive_size = archive_size(&header);
    report.duration = start.elapsed();

    info!(
        archive = %dest.display(),
        entries = report.files_added(),
        bytes = report.archive_size,
        dry_run = config.dry_run,
        "archive created"
    );
    Ok(report)
}

fn add_all<W: std::io::Write + std::io::Seek>(
    writer: &mut PakWriter<W>,
    root: &Path,
    selected: &[String],
    config: &PakConfig,
) -> Result<()> {
    for relative in selected {
        let stored = config.fold(relative);
        let entry = writer.add_file(&stored, &root.join(relative))?;
        debug!(path = %entry.path, offset = entry.offset, size = entry.size, "added");
    }
    Ok(())
}

fn archive_size(header: &ArchiveHeader) -> u64 {
    u64::from(header.table_offset) + u64::from(header.table_size)
}

/// Normalizes a relative source path to `/`-separated form.
fn canonical_relative(path: &str) -> Result<String> {
    let unsafe_path = || PakError::UnsafePath {
        path: path.to_string(),
    };
    if path.starts_with('/') {
        return Err(unsafe_path());
    }

    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(unsafe_path()),
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return Err(unsafe_path());
    }
    Ok(segments.join("/"))
}

fn check_root(root: &Path) -> Result<()> {
    match std::fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PakError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PakError::NotFound {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(PakError::Io(e)),
    }
}

fn check_destination(dest: &Path) -> Result<()> {
    if std::fs::symlink_metadata(dest).is_ok() {
        return Err(PakError::DestinationExists {
            path: dest.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PakArchive;
    use crate::test_utils::summarize;
    use crate::test_utils::write_tree_file;
    use tempfile::TempDir;

    #[test]
    fn test_create_from_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        write_tree_file(&root, "progs.dat", b"qc");
        write_tree_file(&root, "maps/e1m1.bsp", b"bsp!");
        let dest = temp.path().join("pak0.pak");

        let report = create_pak(&root, &dest, &PakConfig::default()).unwrap();

        assert_eq!(
            summarize(&report.entries),
            [("maps/e1m1.bsp", 12, 4), ("progs.dat", 16, 2)]
        );
        assert_eq!(report.bytes_written, 6);
        assert_eq!(report.archive_size, 18 + 2 * 64);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), report.archive_size);

        let mut pak = PakArchive::open(&dest).unwrap();
        assert_eq!(pak.list(None, false).unwrap(), report.entries);
    }

    #[test]
    fn test_destination_under_root_not_archived() {
        let temp = TempDir::new().unwrap();
        write_tree_file(temp.path(), "a.txt", b"a");
        write_tree_file(temp.path(), "z/b.txt", b"b");
        let dest = temp.path().join("out.pak");

        let report = create_pak(temp.path(), &dest, &PakConfig::default()).unwrap();
        assert_eq!(
            summarize(&report.entries),
            [("a.txt", 12, 1), ("z/b.txt", 13, 1)]
        );

        let mut pak = PakArchive::open(&dest).unwrap();
        assert_eq!(pak.list(None, false).unwrap(), report.entries);
    }

    #[test]
    fn test_existing_destination_refused() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        write_tree_file(&root, "a.txt", b"a");
        let dest = temp.path().join("pak0.pak");
        std::fs::write(&dest, b"keep me").unwrap();

        for dry_run in [false, true] {
            let config = PakConfig::default().with_dry_run(dry_run);
            let result = create_pak(&root, &dest, &config);
            assert!(matches!(result, Err(PakError::DestinationExists { .. })));
        }
        assert_eq!(std::fs::read(&dest).unwrap(), b"keep me");
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = create_pak(
            &temp.path().join("nope"),
            &temp.path().join("pak0.pak"),
            &PakConfig::default(),
        );
        assert!(matches!(result, Err(PakError::NotFound { .. })));
    }

    #[test]
    fn test_dry_run_validates_without_writing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        write_tree_file(&root, "ok.txt", b"a");
        write_tree_file(&root, &"x".repeat(56), b"b");
        let dest = temp.path().join("pak0.pak");
        let config = PakConfig::default().with_dry_run(true);

        let result = create_pak(&root, &dest, &config);
        assert!(matches!(result, Err(PakError::PathTooLong { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_dry_run_reports_layout() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        write_tree_file(&root, "a.txt", b"abc");
        let dest = temp.path().join("pak0.pak");
        let config = PakConfig::default().with_dry_run(true);

        let report = create_pak(&root, &dest, &config).unwrap();
        assert!(report.dry_run);
        assert_eq!(summarize(&report.entries), [("a.txt", 12, 3)]);
        assert!(!dest.exists());
    }

    #[test]
    fn test_filter_and_fold() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        write_tree_file(&root, "Maps/E1M1.bsp", b"x");
        write_tree_file(&root, "README.txt", b"y");
        let dest = temp.path().join("pak0.pak");
        let config = PakConfig::default()
            .with_path_filter("^Maps/")
            .with_case_fold(true);

        let report = create_pak(&root, &dest, &config).unwrap();
        assert_eq!(summarize(&report.entries), [("maps/e1m1.bsp", 12, 1)]);
        assert_eq!(report.files_filtered, 1);
    }

    #[test]
    fn test_explicit_paths_keep_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        write_tree_file(&root, "b.txt", b"b");
        write_tree_file(&root, "a/c.txt", b"c");
        let dest = temp.path().join("pak0.pak");

        let report =
            create_pak_from(&root, ["b.txt", "./a//c.txt"], &dest, &PakConfig::default()).unwrap();
        assert_eq!(summarize(&report.entries), [("b.txt", 12, 1), ("a/c.txt", 13, 1)]);
    }

    #[test]
    fn test_failed_run_removes_partial_archive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        write_tree_file(&root, "b/one.txt", b"b");
        let dest = temp.path().join("pak0.pak");

        let result = create_pak_from(&root, ["b/one.txt", "B/ONE.TXT"], &dest, &PakConfig::default());
        assert!(matches!(
            result,
            Err(PakError::DuplicateCaseInsensitivePath { .. })
        ));
        assert!(!dest.exists());
    }

    #[test]
    fn test_explicit_path_outside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        std::fs::create_dir_all(&root).unwrap();
        let dest = temp.path().join("pak0.pak");

        let result = create_pak_from(&root, ["../secret"], &dest, &PakConfig::default());
        assert!(matches!(result, Err(PakError::UnsafePath { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_canonical_relative() {
        assert_eq!(canonical_relative("a//b/./c").unwrap(), "a/b/c");
        assert!(canonical_relative("").is_err());
        assert!(canonical_relative("/abs").is_err());
    }
}
