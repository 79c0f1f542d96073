//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use panicwipe::TriggerMethod;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Emergency data destruction
///
/// Destroys secrets in memory, the clipboard, cached responses, cached
/// models and secure storage, then asks the backend to do the same.
/// Every run ends with a report of what succeeded and what did not.
#[derive(Parser, Debug)]
#[command(name = "pwipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short, long, env = "PWIPE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Append each finished report as one JSON line to this file
    #[arg(long, env = "PWIPE_AUDIT_LOG", global = true)]
    pub audit_log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Destroy local and remote data now
    Wipe(WipeArgs),

    /// List what a wipe would destroy, deleting nothing
    Audit,

    /// Manage configuration
    Config(ConfigArgs),
}

// ============================================================================
// Wipe command
// ============================================================================

#[derive(Args, Debug)]
pub struct WipeArgs {
    /// How the wipe was triggered (panic_button, text_confirmation, key_combo, ...)
    #[arg(short, long)]
    pub method: TriggerMethod,

    /// Confirmation phrase for text_confirmation (prompted if omitted)
    #[arg(long)]
    pub phrase: Option<String>,

    /// How long the key combination was held, for key_combo
    #[arg(long)]
    pub hold_ms: Option<u64>,

    /// Skip the backend wipe even if the trigger requests one
    #[arg(long)]
    pub local_only: bool,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value (e.g. wipe.passes 3)
    Set {
        /// Dotted key
        key: String,

        /// Value; lists are comma separated
        value: String,
    },

    /// Show config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_wipe_flags() {
        let cli = Cli::parse_from([
            "pwipe",
            "wipe",
            "--method",
            "key-combo",
            "--hold-ms",
            "3500",
            "--local-only",
            "-o",
            "json",
        ]);
        let Commands::Wipe(args) = cli.command else {
            panic!("expected wipe");
        };
        assert_eq!(args.method, TriggerMethod::KeyCombo);
        assert_eq!(args.hold_ms, Some(3500));
        assert!(args.local_only);
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(Cli::try_parse_from(["pwipe", "wipe", "--method", "shake"]).is_err());
    }
}
