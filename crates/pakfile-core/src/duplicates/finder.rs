//! Detecting paths shadowed across archives.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use flate2::Crc;
use tracing::debug;
use tracing::trace;

use super::discovery::load_order;
use crate::PakArchive;
use crate::PakConfig;
use crate::Result;
use crate::formats::DirectoryEntry;

/// One archive holding a duplicated path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateOwner {
    /// Archive file.
    pub archive: PathBuf,
    /// The entry as stored in that archive (folded if requested).
    pub entry: DirectoryEntry,
}

/// A path present in more than one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    /// Entry path (folded if requested).
    pub path: String,
    /// Owning archives, highest load priority first.
    pub owners: Vec<DuplicateOwner>,
    /// Shared CRC-32 of an identical group, in checksum mode.
    pub checksum: Option<u32>,
}

impl DuplicateRecord {
    /// Owning archive paths, highest load priority first.
    pub fn archives(&self) -> impl Iterator<Item = &Path> {
        self.owners.iter().map(|owner| owner.archive.as_path())
    }

    /// Returns `true` for an identical-content group from checksum mode.
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.checksum.is_some()
    }
}

impl fmt::Display for DuplicateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.path)?;
        for (i, archive) in self.archives().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", archive.display())?;
        }
        if self.is_identical() {
            write!(f, " [identical]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    archive: usize,
    entry: DirectoryEntry,
}

/// Finds paths present in more than one archive across `locations`.
///
/// Archives are read in load order (see [`load_order`]). A path is reported
/// when its owners span more than one archive and at least one owner is not
/// excluded by `config.exclude_archives`. Records come out in the order the
/// paths were first seen.
///
/// With `config.use_checksum`, owners of each such path are grouped by size
/// and then by CRC-32 of their bytes; each group of identical entries that
/// still satisfies the rule above becomes its own record. Same-path entries
/// whose contents differ are not reported.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, or if a discovered
/// archive cannot be opened or read.
///
/// # Examples
///
/// ```no_run
/// use pakfile_core::PakConfig;
/// use pakfile_core::duplicates::find_duplicates;
///
/// # fn main() -> Result<(), pakfile_core::PakError> {
/// let config = PakConfig::default().exclude_archive("pak0");
/// for record in find_duplicates(&["quake/id1"], &config)? {
///     println!("{record}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn find_duplicates<P: AsRef<Path>>(
    locations: &[P],
    config: &PakConfig,
) -> Result<Vec<DuplicateRecord>> {
    config.validate()?;
    let filter = config.compile_filter()?;

    let mut archives = Vec::new();
    for path in load_order(locations) {
        archives.push(PakArchive::open(path)?);
    }

    let mut order: Vec<String> = Vec::new();
    let mut by_path: HashMap<String, Vec<Candidate>> = HashMap::new();
    for (index, archive) in archives.iter_mut().enumerate() {
        for entry in archive.entries(filter.as_ref(), config.case_fold)? {
            let entry = entry?;
            let candidates = by_path.entry(entry.path.clone()).or_insert_with(|| {
                order.push(entry.path.clone());
                Vec::new()
            });
            candidates.push(Candidate {
                archive: index,
                entry,
            });
        }
    }
    debug!(
        archives = archives.len(),
        paths = order.len(),
        "indexed directory tables"
    );

    let mut records = Vec::new();
    for path in order {
        let Some(candidates) = by_path.remove(&path) else {
            continue;
        };
        if !is_reportable(&candidates, &archives, config) {
            continue;
        }

        if config.use_checksum {
            for (checksum, group) in identical_groups(&candidates, &mut archives, config)? {
                if is_reportable(&group, &archives, config) {
                    records.push(record(&path, &group, &archives, Some(checksum)));
                }
            }
        } else {
            records.push(record(&path, &candidates, &archives, None));
        }
    }

    debug!(records = records.len(), checksum = config.use_checksum, "duplicate search done");
    Ok(records)
}

fn is_reportable(candidates: &[Candidate], archives: &[PakArchive], config: &PakConfig) -> bool {
    let mut distinct: Vec<usize> = candidates.iter().map(|c| c.archive).collect();
    distinct.dedup();
    distinct.len() > 1
        && candidates
            .iter()
            .any(|c| !config.is_excluded(archives[c.archive].path()))
}

/// Splits candidates into groups of identical content.
///
/// Only sizes shared by more than one candidate are checksummed, and
/// checksums are compared only within one size, so a group is keyed by
/// `(size, crc)`. Groups keep load order both among and within themselves.
fn identical_groups(
    candidates: &[Candidate],
    archives: &mut [PakArchive],
    config: &PakConfig,
) -> Result<Vec<(u32, Vec<Candidate>)>> {
    let mut by_size: Vec<(u32, Vec<&Candidate>)> = Vec::new();
    for candidate in candidates {
        match by_size.iter_mut().find(|(size, _)| *size == candidate.entry.size) {
            Some((_, group)) => group.push(candidate),
            None => by_size.push((candidate.entry.size, vec![candidate])),
        }
    }

    let mut groups: Vec<(u32, Vec<Candidate>)> = Vec::new();
    for (_, members) in by_size.into_iter().filter(|(_, m)| m.len() > 1) {
        let mut by_crc: Vec<(u32, Vec<Candidate>)> = Vec::new();
        for candidate in members {
            let archive = &mut archives[candidate.archive];
            let crc = entry_checksum(archive, &candidate.entry, config.chunk_size)?;
            trace!(
                archive = %archive.path().display(),
                path = %candidate.entry.path,
                size = candidate.entry.size,
                crc = format_args!("{crc:08x}"),
                "checksummed"
            );
            match by_crc.iter_mut().find(|(sum, _)| *sum == crc) {
                Some((_, group)) => group.push(candidate.clone()),
                None => by_crc.push((crc, vec![candidate.clone()])),
            }
        }
        groups.extend(by_crc);
    }
    Ok(groups)
}

/// CRC-32 of an entry's bytes, streamed in `chunk_size` pieces.
///
/// # Errors
///
/// Returns `TruncatedArchive` if the entry body is short, or any read error.
pub fn entry_checksum(
    archive: &mut PakArchive,
    entry: &DirectoryEntry,
    chunk_size: usize,
) -> Result<u32> {
    let mut crc = Crc::new();
    for chunk in archive.stream_bytes(entry, chunk_size)? {
        crc.update(&chunk?);
    }
    Ok(crc.sum())
}

fn record(
    path: &str,
    candidates: &[Candidate],
    archives: &[PakArchive],
    checksum: Option<u32>,
) -> DuplicateRecord {
    DuplicateRecord {
        path: path.to_string(),
        owners: candidates
            .iter()
            .map(|c| DuplicateOwner {
                archive: archives[c.archive].path().to_path_buf(),
                entry: c.entry.clone(),
            })
            .collect(),
        checksum,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::write_pak;
    use tempfile::TempDir;

    fn stems(record: &DuplicateRecord) -> Vec<String> {
        record
            .archives()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn summary(records: &[DuplicateRecord]) -> Vec<(String, Vec<String>)> {
        records
            .iter()
            .map(|r| (r.path.clone(), stems(r)))
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_same_path_in_two_archives() {
        let temp = TempDir::new().unwrap();
        write_pak(temp.path(), "pak0.pak", &[("progs.dat", b"old"), ("a.wav", b"1")]);
        write_pak(temp.path(), "pak1.pak", &[("progs.dat", b"new")]);

        let records = find_duplicates(&[temp.path()], &PakConfig::default()).unwrap();
        assert_eq!(
            summary(&records),
            [("progs.dat".to_string(), strings(&["pak1", "pak0"]))]
        );
        assert_eq!(records[0].owners[0].entry.size, 3);
        assert_eq!(records[0].checksum, None);
    }

    #[test]
    fn test_fold_merges_case_variants() {
        let temp = TempDir::new().unwrap();
        write_pak(temp.path(), "pak0.pak", &[("Maps/E1M1.bsp", b"1")]);
        write_pak(temp.path(), "pak1.pak", &[("maps/e1m1.bsp", b"2")]);

        let records = find_duplicates(&[temp.path()], &PakConfig::default()).unwrap();
        assert!(records.is_empty());

        let config = PakConfig::default().with_case_fold(true);
        let records = find_duplicates(&[temp.path()], &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "maps/e1m1.bsp");
    }

    #[test]
    fn test_filter_restricts_paths() {
        let temp = TempDir::new().unwrap();
        write_pak(temp.path(), "pak0.pak", &[("a.wav", b"1"), ("b.bsp", b"1")]);
        write_pak(temp.path(), "pak1.pak", &[("a.wav", b"2"), ("b.bsp", b"2")]);

        let config = PakConfig::default().with_path_filter(r"\.bsp$");
        let records = find_duplicates(&[temp.path()], &config).unwrap();
        assert_eq!(summary(&records)[0].0, "b.bsp");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_checksum_groups() {
        let temp = TempDir::new().unwrap();
        write_pak(temp.path(), "pak0.pak", &[("same.txt", b"abc"), ("diff.txt", b"xyz")]);
        write_pak(temp.path(), "pak1.pak", &[("same.txt", b"abc"), ("diff.txt", b"xyw")]);
        write_pak(temp.path(), "pak2.pak", &[("same.txt", b"abcd")]);

        let config = PakConfig::default().with_checksum(true);
        let records = find_duplicates(&[temp.path()], &config).unwrap();

        assert_eq!(
            summary(&records),
            [("same.txt".to_string(), strings(&["pak1", "pak0"]))]
        );
        let mut crc = Crc::new();
        crc.update(b"abc");
        assert_eq!(records[0].checksum, Some(crc.sum()));
        assert!(records[0].to_string().ends_with(" [identical]"));
    }

    #[test]
    fn test_checksum_never_merges_sizes() {
        // CRC-32 of these four bytes is 0, the same as of an empty body.
        let forged: &[u8] = &[157, 10, 217, 109];
        let mut crc = Crc::new();
        crc.update(forged);
        assert_eq!(crc.sum(), Crc::new().sum());

        let temp = TempDir::new().unwrap();
        write_pak(temp.path(), "pak0.pak", &[("x", b"")]);
        write_pak(temp.path(), "pak1.pak", &[("x", b"")]);
        write_pak(temp.path(), "pak2.pak", &[("x", forged)]);
        write_pak(temp.path(), "pak3.pak", &[("x", forged)]);

        let config = PakConfig::default().with_checksum(true);
        let records = find_duplicates(&[temp.path()], &config).unwrap();

        assert_eq!(
            summary(&records),
            [
                ("x".to_string(), strings(&["pak3", "pak2"])),
                ("x".to_string(), strings(&["pak1", "pak0"])),
            ]
        );
        for record in &records {
            let sizes: Vec<u32> = record.owners.iter().map(|o| o.entry.size).collect();
            assert!(sizes.windows(2).all(|w| w[0] == w[1]));
        }
    }

    #[test]
    fn test_checksum_respects_exclusion_per_group() {
        let temp = TempDir::new().unwrap();
        write_pak(temp.path(), "pak0.pak", &[("a", b"same")]);
        write_pak(temp.path(), "pak1.pak", &[("a", b"same")]);
        write_pak(temp.path(), "pak2.pak", &[("a", b"diff")]);

        let config = PakConfig::default()
            .with_checksum(true)
            .exclude_archive("pak0")
            .exclude_archive("pak1");
        let records = find_duplicates(&[temp.path()], &config).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_no_archives() {
        let temp = TempDir::new().unwrap();
        let records = find_duplicates(&[temp.path()], &PakConfig::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_display() {
        let record = DuplicateRecord {
            path: "maps/a.bsp".to_string(),
            owners: vec![
                DuplicateOwner {
                    archive: PathBuf::from("id1/pak1.pak"),
                    entry: DirectoryEntry::new("maps/a.bsp", 12, 1),
                },
                DuplicateOwner {
                    archive: PathBuf::from("id1/pak0.pak"),
                    entry: DirectoryEntry::new("maps/a.bsp", 12, 1),
                },
            ],
            checksum: None,
        };
        assert_eq!(record.to_string(), "maps/a.bsp: id1/pak1.pak, id1/pak0.pak");
    }
}
