//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use pakfile_core::list;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = args.select.to_config();
    let entries = add_archive_context(list(&args.archive, &config), &args.archive)?;
    formatter.format_entries(&args.archive, &entries, args.long)
}
