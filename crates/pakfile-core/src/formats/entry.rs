//! Directory record codec.

use super::header::ENTRY_RECORD_SIZE;
use super::read_u32_le;
use crate::PakError;
use crate::Result;

/// Width of the NUL-terminated path field.
pub const PATH_FIELD_SIZE: usize = 56;

/// Longest storable path, leaving room for the terminator.
pub const MAX_PATH_LEN: usize = PATH_FIELD_SIZE - 1;

/// One record of the directory table.
///
/// `offset` and `size` address the entry's bytes inside the archive body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    /// Forward-slash separated relative path, as stored.
    pub path: String,
    /// Absolute byte offset of the entry's data.
    pub offset: u32,
    /// Byte length of the entry's data.
    pub size: u32,
}

impl DirectoryEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(path: impl Into<String>, offset: u32, size: u32) -> Self {
        Self {
            path: path.into(),
            offset,
            size,
        }
    }

    /// Decodes a 64-byte directory record.
    ///
    /// Only the bytes before the first NUL form the path; anything after the
    /// terminator is ignored, since historical archives leave garbage there.
    /// A field with no terminator yields all 56 bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakfile_core::formats::DirectoryEntry;
    ///
    /// let mut record = [0xAAu8; 64];
    /// record[..9].copy_from_slice(b"progs.dat");
    /// record[9] = 0;
    /// record[56..60].copy_from_slice(&12u32.to_le_bytes());
    /// record[60..].copy_from_slice(&3u32.to_le_bytes());
    ///
    /// let entry = DirectoryEntry::decode(&record);
    /// assert_eq!(entry.path, "progs.dat");
    /// assert_eq!((entry.offset, entry.size), (12, 3));
    /// ```
    #[must_use]
    pub fn decode(record: &[u8; ENTRY_RECORD_SIZE]) -> Self {
        let field = &record[..PATH_FIELD_SIZE];
        let len = field.iter().position(|&b| b == 0).unwrap_or(PATH_FIELD_SIZE);

        Self {
            path: String::from_utf8_lossy(&field[..len]).into_owned(),
            offset: read_u32_le(record, PATH_FIELD_SIZE),
            size: read_u32_le(record, PATH_FIELD_SIZE + 4),
        }
    }

    /// Encodes the entry into a 64-byte record with a zero-filled path tail.
    ///
    /// # Errors
    ///
    /// Returns `NonAsciiPath` or `PathTooLong` if the path cannot be stored.
    pub fn encode(&self) -> Result<[u8; ENTRY_RECORD_SIZE]> {
        validate_path(&self.path)?;

        let mut record = [0u8; ENTRY_RECORD_SIZE];
        record[..self.path.len()].copy_from_slice(self.path.as_bytes());
        record[PATH_FIELD_SIZE..PATH_FIELD_SIZE + 4].copy_from_slice(&self.offset.to_le_bytes());
        record[PATH_FIELD_SIZE + 4..].copy_from_slice(&self.size.to_le_bytes());
        Ok(record)
    }

    /// Absolute offset one past the entry's last byte.
    #[must_use]
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }
}

/// Checks that `path` fits the record's path field.
///
/// ASCII is checked first, so a long path with a non-ASCII character reports
/// `NonAsciiPath`.
///
/// # Errors
///
/// Returns `NonAsciiPath` for characters outside 7-bit ASCII and
/// `PathTooLong` for paths longer than [`MAX_PATH_LEN`] bytes.
pub fn validate_path(path: &str) -> Result<()> {
    if !path.is_ascii() {
        return Err(PakError::NonAsciiPath {
            path: path.to_string(),
        });
    }
    if path.len() > MAX_PATH_LEN {
        return Err(PakError::PathTooLong {
            path: path.to_string(),
            len: path.len(),
        });
    }
    Ok(())
}
