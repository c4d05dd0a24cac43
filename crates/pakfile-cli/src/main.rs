//! pakfile - Command-line utility for PACK-format game asset archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(code) => code,
        Err(err) => {
            formatter.format_error(cli.command.name(), &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn output::OutputFormatter) -> Result<ExitCode> {
    match &cli.command {
        cli::Commands::Create(args) => commands::create::execute(args, formatter)?,
        cli::Commands::Extract(args) => {
            return commands::extract::execute(args, formatter, cli.quiet || cli.json);
        }
        cli::Commands::List(args) => commands::list::execute(args, formatter)?,
        cli::Commands::Cat(args) => commands::cat::execute(args)?,
        cli::Commands::Dupes(args) => commands::dupes::execute(args, formatter)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr. `RUST_LOG` wins; otherwise `--verbose` selects debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
