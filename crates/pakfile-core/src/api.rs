//! High-level public API for archive creation, extraction and inspection.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::PakArchive;
use crate::PakConfig;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::creation::CreationReport;
use crate::creation::create_pak;
use crate::duplicates::DuplicateRecord;
use crate::extraction::Extractor;
use crate::extraction::OverwritePrompt;
use crate::formats::DirectoryEntry;
use crate::report::ExtractionReport;
use crate::report::ProgressCallback;

/// Creates an archive at `destination` from every regular file under `root`.
///
/// # Arguments
///
/// * `root` - Directory whose files become entries, relative to it
/// * `destination` - Archive file to create; must not exist
/// * `config` - `case_fold`, `path_filter`, `dry_run` and `chunk_size` apply
///
/// # Errors
///
/// Returns an error if:
/// - The root is missing or not a directory
/// - The destination already exists
/// - Two paths collide case-insensitively
/// - A path is too long or not ASCII
/// - I/O operations fail
///
/// # Examples
///
/// ```no_run
/// use pakfile_core::PakConfig;
/// use pakfile_core::create;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = create("mod/src", "mod/pak0.pak", &PakConfig::default())?;
/// println!("Added {} files", report.files_added());
/// # Ok(())
/// # }
/// ```
pub fn create<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    destination: Q,
    config: &PakConfig,
) -> Result<CreationReport> {
    create_pak(root.as_ref(), destination.as_ref(), config)
}

/// Extracts the selected entries of an archive below `destination_root`.
///
/// Existing files are resolved through `prompt` unless `config.on_conflict`
/// already holds `All` or `None`. Each entry outcome is passed to `progress`
/// as it happens.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or read, a destination
/// file cannot be written, or the prompt closes. Destination conflicts and
/// unsafe entry paths are reported per entry instead.
///
/// # Examples
///
/// ```no_run
/// use pakfile_core::NoopProgress;
/// use pakfile_core::PakConfig;
/// use pakfile_core::extract;
/// use pakfile_core::extraction::ConflictDecision;
/// use pakfile_core::extraction::ReaderPrompt;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PakConfig::default().with_on_conflict(ConflictDecision::None);
/// let mut prompt = ReaderPrompt::new(std::io::stdin().lock(), std::io::stderr());
/// let report = extract("id1/pak0.pak", "out", &config, &mut prompt, &mut NoopProgress)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
    archive: P,
    destination_root: Q,
    config: &PakConfig,
    prompt: &mut dyn OverwritePrompt,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    config.validate()?;
    let mut pak = PakArchive::open(archive)?;
    Extractor::new(config, prompt, progress).extract(&mut pak, destination_root.as_ref())
}

/// Lists the selected directory entries of an archive in table order.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or its table is short.
///
/// # Examples
///
/// ```no_run
/// use pakfile_core::PakConfig;
/// use pakfile_core::list;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for entry in list("id1/pak0.pak", &PakConfig::default().with_path_filter("^maps/"))? {
///     println!("{:>10} {}", entry.size, entry.path);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list<P: AsRef<Path>>(archive: P, config: &PakConfig) -> Result<Vec<DirectoryEntry>> {
    config.validate()?;
    let filter = config.compile_filter()?;
    let mut pak = PakArchive::open(archive)?;
    pak.list(filter.as_ref(), config.case_fold)
}

/// Writes the bytes of every selected entry, in table order, into `sink`.
///
/// Returns the total number of bytes written.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened, an entry body is short,
/// or writing to `sink` fails.
pub fn stream_to<P: AsRef<Path>, W: Write + ?Sized>(
    archive: P,
    config: &PakConfig,
    sink: &mut W,
) -> Result<u64> {
    config.validate()?;
    let filter = config.compile_filter()?;
    let mut pak = PakArchive::open(archive)?;
    let entries = pak.list(filter.as_ref(), config.case_fold)?;

    let mut buffer = CopyBuffer::with_size(config.chunk_size);
    let mut total = 0u64;
    for entry in &entries {
        total += pak.copy_entry(entry, sink, &mut buffer)?;
    }
    sink.flush()?;

    debug!(archive = %pak.path().display(), entries = entries.len(), bytes = total, "streamed");
    Ok(total)
}

/// Finds paths present in more than one archive across search locations.
///
/// See [`crate::duplicates::find_duplicates`].
///
/// # Errors
///
/// Returns an error if the configuration is invalid or an archive cannot be
/// read.
pub fn find_duplicates<P: AsRef<Path>>(
    locations: &[P],
    config: &PakConfig,
) -> Result<Vec<DuplicateRecord>> {
    crate::duplicates::find_duplicates(locations, config)
}
