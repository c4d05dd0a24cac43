//! Helpers for building PAK archives in tests.
//!
//! These builders encode archives by hand rather than through the archive
//! writer, so reader tests do not depend on writer behaviour.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::Path;
use std::path::PathBuf;

use crate::formats::ArchiveHeader;
use crate::formats::DirectoryEntry;
use crate::formats::ENTRY_RECORD_SIZE;
use crate::formats::HEADER_SIZE;
use crate::formats::PATH_FIELD_SIZE;

/// Builds an in-memory archive with contiguous bodies from `(path, data)`
/// pairs, in the given order.
///
/// # Examples
///
/// ```
/// use pakfile_core::test_utils::build_pak;
///
/// let pak = build_pak(&[("progs.dat", b"qc"), ("maps/e1m1.bsp", b"bsp")]);
/// assert_eq!(&pak[..4], b"PACK");
/// assert_eq!(pak.len(), 12 + 5 + 2 * 64);
/// ```
#[must_use]
pub fn build_pak(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let records: Vec<[u8; ENTRY_RECORD_SIZE]> = {
        let mut offset = HEADER_SIZE as u32;
        entries
            .iter()
            .map(|(path, data)| {
                let size = data.len() as u32;
                let record = raw_record(path.as_bytes(), offset, size);
                offset += size;
                record
            })
            .collect()
    };
    let bodies: Vec<&[u8]> = entries.iter().map(|(_, data)| *data).collect();
    build_pak_raw(&bodies, &records)
}

/// Builds an archive from pre-encoded records and body blobs.
///
/// Bodies are laid out contiguously after the header; records are written
/// verbatim, so offsets, sizes and path padding are fully under test control.
#[must_use]
pub fn build_pak_raw(bodies: &[&[u8]], records: &[[u8; ENTRY_RECORD_SIZE]]) -> Vec<u8> {
    let body_len: usize = bodies.iter().map(|b| b.len()).sum();
    let table_offset = (HEADER_SIZE + body_len) as u32;
    let table_size = (records.len() * ENTRY_RECORD_SIZE) as u32;

    let mut out = ArchiveHeader::new(table_offset, table_size).encode().to_vec();
    for body in bodies {
        out.extend_from_slice(body);
    }
    for record in records {
        out.extend_from_slice(record);
    }
    out
}

/// Encodes a record from raw path-field bytes, without validation.
///
/// `path_field` is copied into the 56-byte field and truncated if longer;
/// the rest of the field is left zero.
#[must_use]
pub fn raw_record(path_field: &[u8], offset: u32, size: u32) -> [u8; ENTRY_RECORD_SIZE] {
    let mut record = [0u8; ENTRY_RECORD_SIZE];
    let len = path_field.len().min(PATH_FIELD_SIZE);
    record[..len].copy_from_slice(&path_field[..len]);
    record[PATH_FIELD_SIZE..PATH_FIELD_SIZE + 4].copy_from_slice(&offset.to_le_bytes());
    record[PATH_FIELD_SIZE + 4..].copy_from_slice(&size.to_le_bytes());
    record
}

/// Writes [`build_pak`] output to `dir/name` and returns the path.
pub fn write_pak(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pak(entries)).unwrap();
    path
}

/// Writes a file under `root`, creating parent directories.
pub fn write_tree_file(root: &Path, relative: &str, data: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, data).unwrap();
    path
}

/// Returns `(path, offset, size)` triples for compact assertions.
#[must_use]
pub fn summarize(entries: &[DirectoryEntry]) -> Vec<(&str, u32, u32)> {
    entries
        .iter()
        .map(|e| (e.path.as_str(), e.offset, e.size))
        .collect()
}
