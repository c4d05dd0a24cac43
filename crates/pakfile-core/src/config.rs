//! Options shared by every archive operation.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;

use crate::PakError;
use crate::Result;
use crate::extraction::ConflictDecision;

/// Default chunk size for streaming entry bytes (1 MiB).
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Options for create, extract, list, stream and duplicate search.
///
/// Every operation reads the fields it cares about and ignores the rest.
///
/// # Examples
///
/// ```
/// use pakfile_core::PakConfig;
///
/// let config = PakConfig::default()
///     .with_case_fold(true)
///     .with_path_filter(r"^maps/")
///     .exclude_archive("pak0");
///
/// assert!(config.validate().is_ok());
/// assert!(config.is_excluded("id1/pak0.pak".as_ref()));
/// ```
#[derive(Debug, Clone)]
pub struct PakConfig {
    /// Lower-case entry paths before filtering, output and comparison.
    ///
    /// Default: `false`.
    pub case_fold: bool,

    /// Regular expression that must match somewhere in an entry path.
    ///
    /// `None` selects every entry. Default: `None`.
    pub path_filter: Option<String>,

    /// Check and validate everything but write nothing.
    ///
    /// Default: `false`.
    pub dry_run: bool,

    /// Archives ignored as sole owners during duplicate search, matched by
    /// full path, file name or file stem.
    ///
    /// Default: empty.
    pub exclude_archives: BTreeSet<String>,

    /// Compare entry contents by CRC-32 during duplicate search.
    ///
    /// Default: `false`.
    pub use_checksum: bool,

    /// Overwrite decision the extraction run starts from.
    ///
    /// Default: [`ConflictDecision::Unset`] (ask on the first conflict).
    pub on_conflict: ConflictDecision,

    /// Maximum bytes moved per read/write while streaming entries.
    ///
    /// Default: [`CHUNK_SIZE`].
    pub chunk_size: usize,
}

impl Default for PakConfig {
    fn default() -> Self {
        Self {
            case_fold: false,
            path_filter: None,
            dry_run: false,
            exclude_archives: BTreeSet::new(),
            use_checksum: false,
            on_conflict: ConflictDecision::Unset,
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl PakConfig {
    /// Creates a new `PakConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether paths are lower-cased.
    #[must_use]
    pub fn with_case_fold(mut self, fold: bool) -> Self {
        self.case_fold = fold;
        self
    }

    /// Sets the path filter pattern.
    #[must_use]
    pub fn with_path_filter(mut self, pattern: impl Into<String>) -> Self {
        self.path_filter = Some(pattern.into());
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Adds one archive identifier to the exclusion set.
    #[must_use]
    pub fn exclude_archive(mut self, id: impl Into<String>) -> Self {
        self.exclude_archives.insert(id.into());
        self
    }

    /// Sets whether duplicate search compares checksums.
    #[must_use]
    pub fn with_checksum(mut self, use_checksum: bool) -> Self {
        self.use_checksum = use_checksum;
        self
    }

    /// Sets the initial overwrite decision for extraction.
    #[must_use]
    pub fn with_on_conflict(mut self, decision: ConflictDecision) -> Self {
        self.on_conflict = decision;
        self
    }

    /// Sets the streaming chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path filter is not a valid regular expression
    /// - The chunk size is zero
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PakError::InvalidConfiguration {
                reason: "chunk size must be greater than zero".to_string(),
            });
        }
        self.compile_filter().map(|_| ())
    }

    /// Compiles the path filter, if one is set.
    pub fn compile_filter(&self) -> Result<Option<PathFilter>> {
        self.path_filter
            .as_deref()
            .map(PathFilter::new)
            .transpose()
    }

    /// Applies case folding to a path according to this configuration.
    #[must_use]
    pub fn fold(&self, path: &str) -> String {
        if self.case_fold {
            path.to_ascii_lowercase()
        } else {
            path.to_string()
        }
    }

    /// Returns `true` if `archive` is named in the exclusion set.
    #[must_use]
    pub fn is_excluded(&self, archive: &Path) -> bool {
        if self.exclude_archives.is_empty() {
            return false;
        }

        let full = archive.to_string_lossy();
        let name = archive.file_name().map(|n| n.to_string_lossy());
        let stem = archive.file_stem().map(|s| s.to_string_lossy());

        self.exclude_archives.iter().any(|id| {
            id.as_str() == full
                || name.as_deref() == Some(id.as_str())
                || stem.as_deref() == Some(id.as_str())
        })
    }
}

/// Compiled path filter: an unanchored regular expression search.
#[derive(Debug, Clone)]
pub struct PathFilter {
    regex: Regex,
}

impl PathFilter {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the pattern does not parse.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| PakError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns `true` if the pattern matches anywhere in `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}
