//! Error conversion utilities for CLI.
//!
//! Converts pakfile-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use pakfile_core::PakError;
use std::path::Path;

/// Converts `PakError` to user-friendly anyhow error with context
pub fn convert_pak_error(err: PakError, archive: &Path) -> anyhow::Error {
    match err {
        PakError::NotFound { path } => {
            anyhow!("No such file or directory: {}", path.display())
        }
        PakError::NotAnArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: Only PACK-format archives (signature \"PACK\") are supported.",
                archive.display(),
                reason
            )
        }
        PakError::TruncatedArchive {
            path,
            expected,
            actual,
        } => {
            anyhow!(
                "Archive '{}' is truncated: {} needs {} bytes, only {} available\n\
                 HINT: The archive may be corrupted or still being written.",
                archive.display(),
                path,
                expected,
                actual
            )
        }
        PakError::PathTooLong { path, len } => {
            anyhow!(
                "Cannot store '{path}' in '{}': path is {len} bytes, the limit is 55\n\
                 HINT: Shorten the file or directory names under the source root.",
                archive.display()
            )
        }
        PakError::NonAsciiPath { path } => {
            anyhow!(
                "Cannot store '{path}' in '{}': path contains non-ASCII characters\n\
                 HINT: Rename the file using plain ASCII characters.",
                archive.display()
            )
        }
        PakError::DuplicateCaseInsensitivePath { path, existing } => {
            anyhow!(
                "Cannot store '{path}' in '{}': it differs from '{existing}' only by case\n\
                 HINT: Rename one of the files; case-insensitive filesystems cannot hold both.",
                archive.display()
            )
        }
        PakError::DestinationExists { path } => {
            anyhow!(
                "Refusing to overwrite existing archive: {}\n\
                 HINT: Remove it first or choose another output path.",
                path.display()
            )
        }
        PakError::SourceChanged { path, .. } => {
            anyhow!(
                "Source file changed while archiving: {}\n\
                 HINT: Make sure nothing writes to the source tree and try again.",
                path.display()
            )
        }
        PakError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid --filter pattern {pattern:?}: {reason}\n\
                 HINT: The filter is a regular expression; escape '.' and other metacharacters."
            )
        }
        PakError::PromptClosed => {
            anyhow!(
                "Input closed while asking whether to overwrite a file\n\
                 HINT: Use --overwrite or --no-overwrite when stdin is not interactive."
            )
        }
        PakError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, PakError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_pak_error(e, archive))
}
