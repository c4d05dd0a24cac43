//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::EntryPrinter;
use anyhow::Context;
use anyhow::Result;
use pakfile_core::extract;
use pakfile_core::extraction::ReaderPrompt;
use std::env;
use std::io;
use std::process::ExitCode;

/// Runs the extraction. Per-entry failures are already in the printed
/// summary, so they yield a failing exit code instead of an error.
pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    quiet: bool,
) -> Result<ExitCode> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let config = args
        .select
        .to_config()
        .with_dry_run(args.dry_run)
        .with_on_conflict(args.on_conflict());

    // Questions go to stderr so stdout stays parseable.
    let mut prompt = ReaderPrompt::new(io::stdin().lock(), io::stderr());
    let mut printer = EntryPrinter::stdio(quiet);

    let report = add_archive_context(
        extract(&args.archive, &output_dir, &config, &mut prompt, &mut printer),
        &args.archive,
    )?;

    formatter.format_extraction_result(&args.archive, &report)?;

    if report.has_errors() {
        formatter.format_warning(&format!(
            "{} of {} entries could not be extracted from '{}'",
            report.errors,
            report.total_items(),
            args.archive.display()
        ));
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
