//! Error types for PAK archive operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PakError`.
pub type Result<T> = std::result::Result<T, PakError>;

/// Describes why an entry could not be placed at its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// A directory already exists where the entry's file must go.
    FileIsDirectory,
    /// A regular file occupies a path that must be a directory.
    AncestorIsFile {
        /// The existing file blocking directory creation.
        ancestor: PathBuf,
    },
    /// The destination or one of its ancestors could not be inspected.
    Unreadable {
        /// The path whose metadata lookup failed.
        path: PathBuf,
        /// The underlying I/O error, rendered.
        reason: String,
    },
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileIsDirectory => write!(f, "destination is a directory"),
            Self::AncestorIsFile { ancestor } => {
                write!(f, "{} is a file, not a directory", ancestor.display())
            }
            Self::Unreadable { path, reason } => {
                write!(f, "cannot inspect {}: {reason}", path.display())
            }
        }
    }
}

/// Errors that can occur while reading, writing or extracting archives.
#[derive(Error, Debug)]
pub enum PakError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input path does not exist.
    #[error("no such file or directory: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("not a regular file: {path}")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// Input path exists but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// File does not carry the PACK signature or its table is malformed.
    #[error("not a pak archive: {0}")]
    NotAnArchive(String),

    /// Archive ended before an entry's declared size was read.
    #[error("truncated archive: {path} declares {expected} bytes, only {actual} available")]
    TruncatedArchive {
        /// Entry (or table) being read.
        path: String,
        /// Declared byte count.
        expected: u64,
        /// Bytes actually available.
        actual: u64,
    },

    /// Entry path does not fit the 56-byte record field.
    #[error("path too long ({len} bytes, max 55): {path}")]
    PathTooLong {
        /// The rejected path.
        path: String,
        /// Byte length of the path without terminator.
        len: usize,
    },

    /// Entry path contains characters outside 7-bit ASCII.
    #[error("path contains non-ASCII characters: {path}")]
    NonAsciiPath {
        /// The rejected path.
        path: String,
    },

    /// Two source paths differ only by letter case.
    #[error("{path} collides with {existing} on case-insensitive filesystems")]
    DuplicateCaseInsensitivePath {
        /// The later path.
        path: String,
        /// The first-seen path it collides with.
        existing: String,
    },

    /// Entry path would escape the extraction root.
    #[error("refusing unsafe entry path: {path}")]
    UnsafePath {
        /// The rejected entry path.
        path: String,
    },

    /// Entry cannot be placed at its destination.
    #[error("cannot extract {path}: {kind}")]
    DestinationConflict {
        /// Destination path on disk.
        path: PathBuf,
        /// Nature of the conflict.
        kind: ConflictKind,
    },

    /// Archive creation refuses to overwrite an existing file.
    #[error("destination already exists: {path}")]
    DestinationExists {
        /// The existing destination.
        path: PathBuf,
    },

    /// Source file changed size while it was being archived.
    #[error("{path} changed while archiving: expected {expected} bytes, read {actual}")]
    SourceChanged {
        /// Source file path.
        path: PathBuf,
        /// Size recorded before streaming.
        expected: u64,
        /// Bytes actually streamed.
        actual: u64,
    },

    /// Archive would exceed the 32-bit offset range of the format.
    #[error("archive too large: {size} bytes exceeds the 4 GiB format limit")]
    ArchiveTooLarge {
        /// Size that would have been reached.
        size: u64,
    },

    /// Path filter is not a valid regular expression.
    #[error("invalid path filter {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Options are inconsistent.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the problem.
        reason: String,
    },

    /// Interactive prompt reached end of input before a valid answer.
    #[error("overwrite prompt closed without an answer")]
    PromptClosed,
}

impl PakError {
    /// Returns `true` if this error only affects a single extracted entry.
    ///
    /// Extraction reports these and continues with the next entry; every
    /// other kind aborts the whole operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakfile_core::PakError;
    ///
    /// let err = PakError::UnsafePath {
    ///     path: "../etc/passwd".to_string(),
    /// };
    /// assert!(err.is_entry_level());
    ///
    /// let err = PakError::NotAnArchive("bad magic".to_string());
    /// assert!(!err.is_entry_level());
    /// ```
    #[must_use]
    pub const fn is_entry_level(&self) -> bool {
        matches!(
            self,
            Self::DestinationConflict { .. } | Self::UnsafePath { .. }
        )
    }

    /// Returns the filesystem path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::NotAFile { path }
            | Self::NotADirectory { path }
            | Self::DestinationConflict { path, .. }
            | Self::DestinationExists { path }
            | Self::SourceChanged { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns the conflict kind for destination conflicts.
    #[must_use]
    pub const fn conflict_kind(&self) -> Option<&ConflictKind> {
        match self {
            Self::DestinationConflict { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
