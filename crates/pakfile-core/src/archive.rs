//! Read access to PAK archives.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::trace;

use crate::PakError;
use crate::Result;
use crate::config::PathFilter;
use crate::copy::CopyBuffer;
use crate::copy::copy_exact;
use crate::formats::ArchiveHeader;
use crate::formats::DirectoryEntry;
use crate::formats::ENTRY_RECORD_SIZE;
use crate::formats::HEADER_SIZE;

/// An open, read-only archive.
///
/// Only the header is validated on open; the directory table is decoded
/// lazily on every call to [`PakArchive::entries`]. The file handle is
/// released when the archive is dropped.
///
/// # Examples
///
/// ```no_run
/// use pakfile_core::PakArchive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pak = PakArchive::open("id1/pak0.pak")?;
/// for entry in pak.entries(None, false)? {
///     let entry = entry?;
///     println!("{} ({} bytes)", entry.path, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PakArchive {
    path: PathBuf,
    file: File,
    header: ArchiveHeader,
}

impl PakArchive {
    /// Opens an archive and checks its signature.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the path does not exist
    /// - `NotAFile` if the path is not a regular file
    /// - `NotAnArchive` if the header is short or the signature is wrong
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PakError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(PakError::Io(e)),
        };
        if !metadata.is_file() {
            return Err(PakError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let mut file = File::open(path)?;
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        (&mut file).take(HEADER_SIZE as u64).read_to_end(&mut bytes)?;

        let header = ArchiveHeader::decode(&bytes).map_err(|e| match e {
            PakError::NotAnArchive(reason) => {
                PakError::NotAnArchive(format!("{}: {reason}", path.display()))
            }
            other => other,
        })?;

        debug!(
            archive = %path.display(),
            table_offset = header.table_offset,
            table_size = header.table_size,
            "opened archive"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
        })
    }

    /// Returns the path the archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the decoded header.
    #[must_use]
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Number of records in the directory table.
    ///
    /// # Errors
    ///
    /// Returns `NotAnArchive` if the table size is malformed.
    pub fn entry_count(&self) -> Result<u32> {
        self.header.entry_count().map_err(|e| match e {
            PakError::NotAnArchive(reason) => {
                PakError::NotAnArchive(format!("{}: {reason}", self.path.display()))
            }
            other => other,
        })
    }

    /// Iterates the directory table in stored order.
    ///
    /// When `fold_case` is set each path is lower-cased before `filter` is
    /// applied, so the filter sees the folded form. Each call re-seeks to the
    /// table, so iteration can be restarted by calling again.
    ///
    /// # Errors
    ///
    /// Returns an error if the table size is malformed or the seek fails.
    /// Read failures while iterating are yielded as `TruncatedArchive`.
    pub fn entries(
        &mut self,
        filter: Option<&PathFilter>,
        fold_case: bool,
    ) -> Result<Entries<'_>> {
        let total = self.entry_count()?;
        self.file
            .seek(SeekFrom::Start(u64::from(self.header.table_offset)))?;
        trace!(archive = %self.path.display(), total, "reading directory table");

        Ok(Entries {
            reader: BufReader::with_capacity(ENTRY_RECORD_SIZE * 64, &mut self.file),
            total,
            index: 0,
            filter: filter.cloned(),
            fold_case,
            failed: false,
        })
    }

    /// Collects the filtered directory table.
    ///
    /// # Errors
    ///
    /// Same as [`PakArchive::entries`].
    pub fn list(
        &mut self,
        filter: Option<&PathFilter>,
        fold_case: bool,
    ) -> Result<Vec<DirectoryEntry>> {
        self.entries(filter, fold_case)?.collect()
    }

    /// Streams an entry's bytes in chunks of at most `chunk_size` bytes.
    ///
    /// Exactly `entry.size` bytes are produced in total; nothing past the
    /// entry is read. A chunk size of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns an error if the seek fails. Running out of data before
    /// `entry.size` bytes is yielded as `TruncatedArchive`.
    pub fn stream_bytes(
        &mut self,
        entry: &DirectoryEntry,
        chunk_size: usize,
    ) -> Result<EntryChunks<'_>> {
        self.file.seek(SeekFrom::Start(u64::from(entry.offset)))?;
        Ok(EntryChunks {
            file: &mut self.file,
            path: entry.path.clone(),
            size: u64::from(entry.size),
            produced: 0,
            chunk_size: chunk_size.max(1),
            done: false,
        })
    }

    /// Copies an entry's bytes into `writer`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns `TruncatedArchive` if the archive ends before `entry.size`
    /// bytes, or any I/O error from reading or writing.
    pub fn copy_entry<W: Write + ?Sized>(
        &mut self,
        entry: &DirectoryEntry,
        writer: &mut W,
        buffer: &mut CopyBuffer,
    ) -> Result<u64> {
        self.file.seek(SeekFrom::Start(u64::from(entry.offset)))?;
        let expected = u64::from(entry.size);
        let copied = copy_exact(&mut self.file, writer, expected, buffer)?;
        if copied < expected {
            return Err(PakError::TruncatedArchive {
                path: entry.path.clone(),
                expected,
                actual: copied,
            });
        }
        Ok(copied)
    }

    /// Reads an entry's bytes into memory.
    ///
    /// The buffer grows with the bytes actually read, so a record declaring
    /// more than the archive holds fails without reserving its size up front.
    ///
    /// # Errors
    ///
    /// Same as [`PakArchive::copy_entry`].
    pub fn read_entry(&mut self, entry: &DirectoryEntry) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut buffer = CopyBuffer::with_size(64 * 1024);
        self.copy_entry(entry, &mut data, &mut buffer)?;
        Ok(data)
    }
}

/// Lazy iterator over directory records. See [`PakArchive::entries`].
#[derive(Debug)]
pub struct Entries<'a> {
    reader: BufReader<&'a mut File>,
    total: u32,
    index: u32,
    filter: Option<PathFilter>,
    fold_case: bool,
    failed: bool,
}

impl Entries<'_> {
    fn read_record(&mut self) -> Result<DirectoryEntry> {
        let mut record = [0u8; ENTRY_RECORD_SIZE];
        self.reader.read_exact(&mut record).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                PakError::TruncatedArchive {
                    path: "directory table".to_string(),
                    expected: u64::from(self.total) * ENTRY_RECORD_SIZE as u64,
                    actual: u64::from(self.index) * ENTRY_RECORD_SIZE as u64,
                }
            } else {
                PakError::Io(e)
            }
        })?;
        Ok(DirectoryEntry::decode(&record))
    }
}

impl Iterator for Entries<'_> {
    type Item = Result<DirectoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && self.index < self.total {
            let mut entry = match self.read_record() {
                Ok(entry) => entry,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };
            self.index += 1;

            if self.fold_case {
                entry.path.make_ascii_lowercase();
            }
            if self
                .filter
                .as_ref()
                .is_none_or(|filter| filter.matches(&entry.path))
            {
                return Some(Ok(entry));
            }
        }
        None
    }
}

/// Lazy iterator over an entry's bytes. See [`PakArchive::stream_bytes`].
#[derive(Debug)]
pub struct EntryChunks<'a> {
    file: &'a mut File,
    path: String,
    size: u64,
    produced: u64,
    chunk_size: usize,
    done: bool,
}

impl Iterator for EntryChunks<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.produced >= self.size {
            return None;
        }

        let remaining = self.size - self.produced;
        let want = usize::try_from(remaining)
            .map_or(self.chunk_size, |r| r.min(self.chunk_size));
        let mut chunk = Vec::with_capacity(want);

        match (&mut *self.file).take(want as u64).read_to_end(&mut chunk) {
            Ok(n) if n == want => {
                self.produced += n as u64;
                Some(Ok(chunk))
            }
            Ok(n) => {
                self.done = true;
                Some(Err(PakError::TruncatedArchive {
                    path: self.path.clone(),
                    expected: self.size,
                    actual: self.produced + n as u64,
                }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(PakError::Io(e)))
            }
        }
    }
}
