//! Create command implementation.

use crate::cli::CreateArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use pakfile_core::create;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = args.select.to_config().with_dry_run(args.dry_run);

    let report = add_archive_context(create(&args.root, &args.archive, &config), &args.archive)?;

    if report.files_added() == 0 {
        formatter.format_warning(&format!(
            "no files selected under {}; the archive is empty",
            args.root.display()
        ));
    }
    formatter.format_creation_result(&args.archive, &report)?;

    Ok(())
}
