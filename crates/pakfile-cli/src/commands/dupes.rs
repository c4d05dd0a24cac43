//! Dupes command implementation.

use crate::cli::DupesArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use pakfile_core::duplicates::discover_archives;
use pakfile_core::find_duplicates;
use std::path::PathBuf;

pub fn execute(args: &DupesArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mut config = args.select.to_config().with_checksum(args.checksum);
    for id in &args.exclude {
        config = config.exclude_archive(id.clone());
    }

    for location in &args.locations {
        if !location.is_dir() {
            formatter.format_warning(&format!("{} is not a directory", location.display()));
        } else if discover_archives(location).is_empty() {
            formatter.format_warning(&format!("no pak0.pak in {}", location.display()));
        }
    }

    let searched: PathBuf = args
        .locations
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
        .into();
    let records = add_archive_context(find_duplicates(&args.locations, &config), &searched)?;

    formatter.format_duplicates(&records)
}
