//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use pakfile_core::ConflictDecision;
use pakfile_core::PakConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pakfile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an archive from a directory tree
    Create(CreateArgs),
    /// Extract archive contents
    Extract(ExtractArgs),
    /// List archive contents without extraction
    List(ListArgs),
    /// Write the bytes of selected entries to stdout
    Cat(CatArgs),
    /// Report paths shadowed across numbered archives
    Dupes(DupesArgs),
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Extract(_) => "extract",
            Self::List(_) => "list",
            Self::Cat(_) => "cat",
            Self::Dupes(_) => "dupes",
        }
    }
}

/// Path selection flags shared by every command.
#[derive(clap::Args, Default)]
pub struct SelectArgs {
    /// Lower-case entry paths before filtering and output
    #[arg(short = 'L', long)]
    pub lowercase: bool,

    /// Only entries whose path matches this regular expression
    #[arg(short = 'F', long, value_name = "REGEX")]
    pub filter: Option<String>,
}

impl SelectArgs {
    pub fn to_config(&self) -> PakConfig {
        let config = PakConfig::new().with_case_fold(self.lowercase);
        match &self.filter {
            Some(pattern) => config.with_path_filter(pattern.clone()),
            None => config,
        }
    }
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Directory whose files become archive entries
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Archive file to create (must not exist)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Validate everything but write nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Check and report but write nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Overwrite existing files without asking
    #[arg(long, conflicts_with = "no_overwrite")]
    pub overwrite: bool,

    /// Keep existing files without asking
    #[arg(long)]
    pub no_overwrite: bool,
}

impl ExtractArgs {
    pub const fn on_conflict(&self) -> ConflictDecision {
        if self.overwrite {
            ConflictDecision::All
        } else if self.no_overwrite {
            ConflictDecision::None
        } else {
            ConflictDecision::Unset
        }
    }
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Show offset and size of each entry
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args)]
pub struct CatArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    #[command(flatten)]
    pub select: SelectArgs,
}

#[derive(clap::Args)]
pub struct DupesArgs {
    /// Directories searched for pak0.pak, pak1.pak, … (first has priority)
    #[arg(value_name = "LOCATION", required = true)]
    pub locations: Vec<PathBuf>,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Archive to ignore as sole owner (path, file name or stem; repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "ID")]
    pub exclude: Vec<String>,

    /// Only report entries whose contents are identical (CRC-32)
    #[arg(short, long)]
    pub checksum: bool,
}
