//! On-disk layout of PAK archives.
//!
//! A PAK file is a 12-byte header, followed by the concatenated contents of
//! every entry, followed by a directory table of fixed 64-byte records. All
//! integers are little-endian `u32`.
//!
//! ```text
//! Header (12 bytes):
//!   0  : b"PACK"
//!   4  : u32 table_offset
//!   8  : u32 table_size
//! Record (64 bytes), repeated table_size / 64 times from table_offset:
//!   0  : 56-byte NUL-terminated ASCII path
//!   56 : u32 offset
//!   60 : u32 size
//! ```

pub mod entry;
pub mod header;

pub use entry::DirectoryEntry;
pub use entry::MAX_PATH_LEN;
pub use entry::PATH_FIELD_SIZE;
pub use entry::validate_path;
pub use header::ArchiveHeader;
pub use header::ENTRY_RECORD_SIZE;
pub use header::HEADER_SIZE;
pub use header::MAGIC;

/// Reads a little-endian `u32` at `at`. Callers guarantee `bytes.len() >= at + 4`.
#[inline]
pub(crate) fn read_u32_le(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
