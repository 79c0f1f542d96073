//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::output::OutputFormat;

/// Run the CLI application.
///
/// Returns a failing exit code when a wipe report contains errors.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = config::resolve(cli.config.as_deref())?;

    // Create context for commands
    let ctx = commands::Context {
        config_path,
        output_format: cli.output.unwrap_or(OutputFormat::Pretty),
        audit_log: cli.audit_log,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Wipe(args) => commands::wipe::execute(ctx, args).await,
        Commands::Audit => commands::audit::execute(ctx).await,
        Commands::Config(args) => commands::config::execute(ctx, args).map(|()| ExitCode::SUCCESS),
    }
}

/// Logs go to stderr so that JSON and YAML reports stay parseable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
