//! `pwipe config` - configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config;
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&ctx, &key, &value),
        ConfigCommands::Path => show_path(&ctx),
        ConfigCommands::Init { force } => init_config(&ctx, force),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = config::load(&ctx.config_path)?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!("{}", format!("# {}", ctx.config_path.display()).dimmed());
            println!();
            print!("{}", config.to_toml_string()?);

            let settings = config.settings();
            if config.wipe.destructive.is_none() {
                println!();
                println!(
                    "{} wipe.destructive not set, defaulting to {} for this build",
                    "Note:".yellow().bold(),
                    settings.destructive
                );
            }
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = config::load(&ctx.config_path)?;

    if let Err(e) = config.set(key, value) {
        anyhow::bail!(
            "{e}\n\n\
             Available keys:\n  \
             wipe.destructive, wipe.refuse_when_disabled, wipe.passes,\n  \
             wipe.stage_deadline_secs, wipe.settle_ms, wipe.clipboard,\n  \
             wipe.escalate_clipboard_verification,\n  \
             paths.model_cache_dir, paths.http_cache_dir, paths.cookie_jar,\n  \
             secure_storage.namespaces, secure_storage.network_credentials,\n  \
             remote.base_url, remote.path, remote.token_env, remote.timeout_secs,\n  \
             trigger.confirmation_phrase, trigger.min_hold_ms, trigger.remote_wipe_on"
        );
    }

    config.save(&ctx.config_path)?;
    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.config_path.display());
    Ok(())
}

fn init_config(ctx: &Context, force: bool) -> Result<()> {
    if ctx.config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            ctx.config_path.display()
        );
    }

    config::template().save(&ctx.config_path)?;
    println!(
        "{} wrote {}",
        "Success:".green().bold(),
        ctx.config_path.display()
    );
    Ok(())
}
