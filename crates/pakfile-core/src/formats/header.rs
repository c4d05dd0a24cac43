//! Archive header codec.

use super::read_u32_le;
use crate::PakError;
use crate::Result;

/// Signature at byte 0 of every archive.
pub const MAGIC: [u8; 4] = *b"PACK";

/// Encoded header length in bytes.
pub const HEADER_SIZE: usize = 12;

/// Encoded directory record length in bytes.
pub const ENTRY_RECORD_SIZE: usize = 64;

/// Fixed archive header locating the directory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Four-byte signature, always [`MAGIC`] for valid archives.
    pub magic: [u8; 4],
    /// Absolute byte offset of the directory table.
    pub table_offset: u32,
    /// Byte length of the directory table.
    pub table_size: u32,
}

impl ArchiveHeader {
    /// Creates a header with the standard signature.
    #[must_use]
    pub const fn new(table_offset: u32, table_size: u32) -> Self {
        Self {
            magic: MAGIC,
            table_offset,
            table_size,
        }
    }

    /// Decodes a header from the first 12 bytes of an archive.
    ///
    /// # Errors
    ///
    /// Returns `NotAnArchive` if fewer than 12 bytes are supplied or the
    /// signature does not match.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakfile_core::formats::ArchiveHeader;
    ///
    /// let bytes = [b'P', b'A', b'C', b'K', 12, 0, 0, 0, 64, 0, 0, 0];
    /// let header = ArchiveHeader::decode(&bytes)?;
    /// assert_eq!(header.table_offset, 12);
    /// assert_eq!(header.entry_count()?, 1);
    /// # Ok::<(), pakfile_core::PakError>(())
    /// ```
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(PakError::NotAnArchive(format!(
                "header needs {HEADER_SIZE} bytes, found {}",
                bytes.len()
            )));
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(PakError::NotAnArchive(format!(
                "bad signature {:?}",
                String::from_utf8_lossy(&magic)
            )));
        }

        Ok(Self {
            magic,
            table_offset: read_u32_le(bytes, 4),
            table_size: read_u32_le(bytes, 8),
        })
    }

    /// Encodes the header into its 12-byte on-disk form.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&self.magic);
        out[4..8].copy_from_slice(&self.table_offset.to_le_bytes());
        out[8..].copy_from_slice(&self.table_size.to_le_bytes());
        out
    }

    /// Number of directory records described by `table_size`.
    ///
    /// # Errors
    ///
    /// Returns `NotAnArchive` if the table size is not a whole number of
    /// records.
    pub fn entry_count(&self) -> Result<u32> {
        let record = ENTRY_RECORD_SIZE as u32;
        if self.table_size % record != 0 {
            return Err(PakError::NotAnArchive(format!(
                "directory size {} is not a multiple of {record}",
                self.table_size
            )));
        }
        Ok(self.table_size / record)
    }

    /// Absolute offset one past the end of the directory table.
    #[must_use]
    pub fn table_end(&self) -> u64 {
        u64::from(self.table_offset) + u64::from(self.table_size)
    }
}
