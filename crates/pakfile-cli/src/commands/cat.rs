//! Cat command implementation.

use crate::cli::CatArgs;
use crate::error::add_archive_context;
use anyhow::Result;
use pakfile_core::stream_to;
use std::io;
use std::io::BufWriter;
use tracing::debug;

/// Writes the selected entry bodies to stdout, bypassing the formatter.
pub fn execute(args: &CatArgs) -> Result<()> {
    let config = args.select.to_config();
    let mut stdout = BufWriter::new(io::stdout().lock());
    let bytes = add_archive_context(stream_to(&args.archive, &config, &mut stdout), &args.archive)?;
    debug!(bytes, "cat finished");
    Ok(())
}
