//! Directory tree walking for archive creation.

use std::path::Path;
use std::path::PathBuf;

use tracing::trace;
use walkdir::WalkDir;

use crate::PakError;
use crate::Result;

/// A regular file found under the creation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full filesystem path.
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated.
    pub relative: String,
}

/// Lists regular files below a root, recursively, sorted by file name at
/// each level.
///
/// Symlinks are not followed and are not listed.
///
/// # Examples
///
/// ```no_run
/// use pakfile_core::creation::SourceWalker;
///
/// # fn main() -> Result<(), pakfile_core::PakError> {
/// for file in SourceWalker::new("id1".as_ref()).walk() {
///     println!("{}", file?.relative);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SourceWalker<'a> {
    root: &'a Path,
}

impl<'a> SourceWalker<'a> {
    /// Creates a walker over `root`.
    #[must_use]
    pub const fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Returns an iterator over the regular files under the root.
    ///
    /// # Errors
    ///
    /// Items are errors when a directory cannot be read.
    pub fn walk(&self) -> impl Iterator<Item = Result<SourceFile>> + '_ {
        WalkDir::new(self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        trace!(path = %entry.path().display(), "not a regular file");
                        return None;
                    }
                    Some(Ok(SourceFile {
                        relative: relative_path(self.root, entry.path()),
                        path: entry.into_path(),
                    }))
                }
                Err(e) => Some(Err(PakError::Io(std::io::Error::other(format!(
                    "walkdir error: {e}"
                ))))),
            })
    }

    /// Collects the whole listing, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first walk error.
    pub fn collect_files(&self) -> Result<Vec<SourceFile>> {
        self.walk().collect()
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
