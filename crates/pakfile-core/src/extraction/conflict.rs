//! Destination probing and overwrite decisions.

use std::collections::HashSet;
use std::io::BufRead;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::PakError;
use crate::Result;

/// Overwrite decision threaded through one extraction run.
///
/// `All` and `None` latch: once chosen, no further prompts are issued and
/// every later conflict gets the same answer. `Yes` and `No` apply to a
/// single entry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictDecision {
    /// No standing decision; ask on the next conflict.
    #[default]
    Unset,
    /// Overwrite this one file.
    Yes,
    /// Keep this one file.
    No,
    /// Overwrite this and every later file.
    All,
    /// Keep this and every later file.
    None,
}

impl ConflictDecision {
    /// Parses a prompt answer.
    ///
    /// Accepts `y`/`yes`, `n`/`no`, `a`/`all` and `none`, ignoring case and
    /// surrounding whitespace. Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use pakfile_core::ConflictDecision;
    ///
    /// assert_eq!(ConflictDecision::parse_answer(" Y\n"), Some(ConflictDecision::Yes));
    /// assert_eq!(ConflictDecision::parse_answer("NONE"), Some(ConflictDecision::None));
    /// assert_eq!(ConflictDecision::parse_answer("maybe"), None);
    /// ```
    #[must_use]
    pub fn parse_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            "a" | "all" => Some(Self::All),
            "none" => Some(Self::None),
            _ => Option::None,
        }
    }

    /// Returns `true` for the latching decisions `All` and `None`.
    #[must_use]
    pub const fn is_sticky(self) -> bool {
        matches!(self, Self::All | Self::None)
    }

    /// Returns `true` if this decision overwrites.
    #[must_use]
    pub const fn allows_overwrite(self) -> bool {
        matches!(self, Self::Yes | Self::All)
    }
}

/// Source of answers when an extracted file already exists.
pub trait OverwritePrompt {
    /// Asks whether `path` may be overwritten and returns the raw answer.
    ///
    /// Returns `Ok(None)` when no more input is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or read.
    fn ask(&mut self, path: &Path) -> io::Result<Option<String>>;
}

/// Line-oriented prompt over any reader/writer pair, such as stdin and stderr.
///
/// # Examples
///
/// ```
/// use pakfile_core::extraction::OverwritePrompt;
/// use pakfile_core::extraction::ReaderPrompt;
/// use std::path::Path;
///
/// let mut prompt = ReaderPrompt::new(&b"all\n"[..], Vec::new());
/// let answer = prompt.ask(Path::new("out/progs.dat"))?;
/// assert_eq!(answer.as_deref(), Some("all\n"));
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ReaderPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ReaderPrompt<R, W> {
    /// Creates a prompt reading answers from `input` and writing questions
    /// to `output`.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the prompt and returns the output writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> OverwritePrompt for ReaderPrompt<R, W> {
    fn ask(&mut self, path: &Path) -> io::Result<Option<String>> {
        write!(
            self.output,
            "{} exists. Overwrite? [y]es, [n]o, [a]ll, [none]: ",
            path.display()
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Option::None);
        }
        Ok(Some(line))
    }
}

/// Resolves whether an existing file at `path` is overwritten.
///
/// A latched decision answers without prompting. Otherwise the prompt is
/// asked until it yields a valid answer; `All` and `None` are latched into
/// `decision` for the rest of the run.
///
/// # Errors
///
/// Returns `PromptClosed` if the prompt runs out of input, or the prompt's
/// I/O error.
pub fn resolve_overwrite(
    decision: &mut ConflictDecision,
    prompt: &mut dyn OverwritePrompt,
    path: &Path,
) -> Result<bool> {
    if decision.is_sticky() {
        return Ok(decision.allows_overwrite());
    }

    loop {
        let Some(answer) = prompt.ask(path)? else {
            return Err(PakError::PromptClosed);
        };
        match ConflictDecision::parse_answer(&answer) {
            Some(choice) => {
                debug!(path = %path.display(), ?choice, "overwrite decision");
                if choice.is_sticky() {
                    *decision = choice;
                }
                return Ok(choice.allows_overwrite());
            }
            Option::None => debug!(answer = answer.trim(), "unrecognised answer"),
        }
    }
}

/// State of a destination path on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Nothing there, and the nearest existing ancestor is a directory.
    Vacant,
    /// A regular file is already there.
    ExistingFile,
    /// A directory is already there.
    ExistingDirectory,
    /// The nearest existing ancestor is a file.
    BlockedBy(PathBuf),
    /// Metadata lookup failed for a reason other than absence.
    Unreadable {
        /// Path whose lookup failed.
        path: PathBuf,
        /// The rendered I/O error.
        reason: String,
    },
}

/// Files and directories a dry run would have created so far.
///
/// `inspect` consults it before the disk, so later entries of a dry run see
/// the effects of earlier ones exactly as in a real run.
#[derive(Debug, Default)]
pub struct PlannedTree {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl PlannedTree {
    /// Records `dest` as a file and its parents up to `root` as directories.
    pub fn record_file(&mut self, root: &Path, dest: &Path) {
        self.files.insert(dest.to_path_buf());
        let Some(parent) = dest.parent() else {
            return;
        };
        for dir in parent.ancestors() {
            if dir == root || !self.dirs.insert(dir.to_path_buf()) {
                break;
            }
        }
    }

    fn kind(&self, path: &Path) -> Option<bool> {
        if self.files.contains(path) {
            Some(false)
        } else if self.dirs.contains(path) {
            Some(true)
        } else {
            None
        }
    }
}

/// Looks up whether `path` is a directory, checking `planned` first.
///
/// `Ok(None)` means the path does not exist.
fn lookup(path: &Path, planned: &PlannedTree) -> std::result::Result<Option<bool>, Destination> {
    if let Some(is_dir) = planned.kind(path) {
        return Ok(Some(is_dir));
    }
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.is_dir())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Destination::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Inspects `dest` and, if it does not exist, its ancestors.
///
/// The walk goes upward from the immediate parent and stops at the first
/// path that exists, however deep. Entries in `planned` count as existing.
#[must_use]
pub fn inspect(dest: &Path, planned: &PlannedTree) -> Destination {
    match lookup(dest, planned) {
        Ok(Some(true)) => return Destination::ExistingDirectory,
        Ok(Some(false)) => return Destination::ExistingFile,
        Ok(None) => {}
        Err(unreadable) => return unreadable,
    }

    let Some(parent) = dest.parent() else {
        return Destination::Vacant;
    };
    for ancestor in parent.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        match lookup(ancestor, planned) {
            Ok(Some(true)) => return Destination::Vacant,
            Ok(Some(false)) => return Destination::BlockedBy(ancestor.to_path_buf()),
            Ok(None) => {}
            Err(unreadable) => return unreadable,
        }
    }
    Destination::Vacant
}
