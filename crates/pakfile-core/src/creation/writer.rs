//! Streaming PAK writer.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;

use tracing::debug;
use tracing::trace;

use crate::PakError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_exact;
use crate::formats::ArchiveHeader;
use crate::formats::DirectoryEntry;
use crate::formats::ENTRY_RECORD_SIZE;
use crate::formats::validate_path;
use crate::io::PositionWriter;

/// Writes entries contiguously after a placeholder header, then appends the
/// directory table and patches the header in [`PakWriter::finish`].
///
/// Paths are checked for case-insensitive uniqueness within one writer, then
/// for length and ASCII.
///
/// # Examples
///
/// ```
/// use pakfile_core::creation::PakWriter;
/// use std::io::Cursor;
///
/// let mut writer = PakWriter::new(Cursor::new(Vec::new()), 4096)?;
/// writer.add_entry("progs.dat", &mut &b"qc"[..], 2, "progs.dat".as_ref())?;
/// let (cursor, header) = writer.finish()?;
///
/// assert_eq!(header.table_offset, 14);
/// assert_eq!(cursor.into_inner().len(), 14 + 64);
/// # Ok::<(), pakfile_core::PakError>(())
/// ```
#[derive(Debug)]
pub struct PakWriter<W: Write + Seek> {
    out: PositionWriter<W>,
    entries: Vec<DirectoryEntry>,
    seen: HashMap<String, String>,
    buffer: CopyBuffer,
}

impl<W: Write + Seek> PakWriter<W> {
    /// Starts an archive at the beginning of `inner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder header cannot be written.
    pub fn new(inner: W, chunk_size: usize) -> Result<Self> {
        let mut out = PositionWriter::new(inner, 0);
        out.write_all(&ArchiveHeader::new(0, 0).encode())?;
        Ok(Self {
            out,
            entries: Vec::new(),
            seen: HashMap::new(),
            buffer: CopyBuffer::with_size(chunk_size),
        })
    }

    /// Entries written so far, in order.
    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Adds a file from disk under `archive_path`.
    ///
    /// The size is taken from the file's metadata before streaming.
    ///
    /// # Errors
    ///
    /// Same as [`PakWriter::add_entry`], plus I/O errors opening `source`.
    pub fn add_file(&mut self, archive_path: &str, source: &Path) -> Result<&DirectoryEntry> {
        self.admit(archive_path)?;
        let mut file = File::open(source)?;
        let size = file.metadata()?.len();
        self.add_entry(archive_path, &mut file, size, source)
    }

    /// Adds `size` bytes from `reader` under `archive_path`.
    ///
    /// `source` only names the data in errors.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `DuplicateCaseInsensitivePath` if the path folds onto an earlier one
    /// - `NonAsciiPath` or `PathTooLong` if the path cannot be encoded
    /// - `ArchiveTooLarge` if the body would pass the 32-bit offset range
    /// - `SourceChanged` if `reader` yields more or fewer than `size` bytes
    pub fn add_entry<R: Read + ?Sized>(
        &mut self,
        archive_path: &str,
        reader: &mut R,
        size: u64,
        source: &Path,
    ) -> Result<&DirectoryEntry> {
        let folded = self.admit(archive_path)?;
        let offset = self.out.offset()?;
        let end = self.out.position() + size;
        let size32 = u32::try_from(size)
            .ok()
            .filter(|_| u32::try_from(end).is_ok())
            .ok_or(PakError::ArchiveTooLarge { size: end })?;

        let copied = copy_exact(reader, &mut self.out, size, &mut self.buffer)?;
        if copied < size {
            return Err(PakError::SourceChanged {
                path: source.to_path_buf(),
                expected: size,
                actual: copied,
            });
        }
        let extra = std::io::copy(reader, &mut std::io::sink())?;
        if extra > 0 {
            return Err(PakError::SourceChanged {
                path: source.to_path_buf(),
                expected: size,
                actual: size + extra,
            });
        }

        trace!(path = archive_path, offset, size, "entry written");
        self.seen.insert(folded, archive_path.to_string());
        self.entries
            .push(DirectoryEntry::new(archive_path, offset, size32));
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Checks a path against earlier ones and the record format, returning
    /// its folded key.
    fn admit(&self, archive_path: &str) -> Result<String> {
        let folded = archive_path.to_ascii_lowercase();
        if let Some(existing) = self.seen.get(&folded) {
            return Err(PakError::DuplicateCaseInsensitivePath {
                path: archive_path.to_string(),
                existing: existing.clone(),
            });
        }
        validate_path(archive_path)?;
        Ok(folded)
    }

    /// Writes the directory table, patches the header and returns the inner
    /// writer with the final header.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveTooLarge` if the table does not fit the offset range,
    /// or any I/O error.
    pub fn finish(mut self) -> Result<(W, ArchiveHeader)> {
        let table_offset = self.out.offset()?;
        let table_len = self.entries.len() as u64 * ENTRY_RECORD_SIZE as u64;
        let table_size = u32::try_from(table_len)
            .ok()
            .filter(|_| u32::try_from(self.out.position() + table_len).is_ok())
            .ok_or(PakError::ArchiveTooLarge {
                size: self.out.position() + table_len,
            })?;

        for entry in &self.entries {
            self.out.write_all(&entry.encode()?)?;
        }

        let header = ArchiveHeader::new(table_offset, table_size);
        let mut inner = self.out.into_inner();
        inner.seek(SeekFrom::Start(0))?;
        inner.write_all(&header.encode())?;
        inner.flush()?;

        debug!(
            entries = self.entries.len(),
            table_offset,
            bytes = u64::from(table_offset) + table_len,
            "archive finished"
        );
        Ok((inner, header))
    }
}
