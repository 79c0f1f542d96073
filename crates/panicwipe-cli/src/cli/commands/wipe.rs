//! `pwipe wipe` - run an emergency wipe.

use anyhow::{Context as _, Result};
use colored::Colorize;
use dialoguer::Input;
use panicwipe::{
    Orchestrator, SecretPool, TriggerContext, TriggerMethod, TriggerPolicy, WipeError,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, warn};

use super::{run_report, Context};
use crate::cli::args::WipeArgs;
use crate::config;

pub async fn execute(ctx: Context, args: WipeArgs) -> Result<ExitCode> {
    let config = config::load(&ctx.config_path)?;
    let policy = config.trigger_policy();

    let context = trigger_context(&policy, &args)?;
    let trigger = policy
        .validate(args.method, context)
        .map_err(|rejection| {
            warn!(method = %args.method, %rejection, "trigger rejected");
            WipeError::from(rejection)
        })
        .context("nothing was wiped")?;
    let trigger = if args.local_only {
        trigger.local_only()
    } else {
        trigger
    };
    debug!(method = %trigger.method(), remote = trigger.remote_wipe(), "trigger accepted");

    let orchestrator = Orchestrator::from_config(&config, SecretPool::new())?;
    run_report(&ctx, &orchestrator, &trigger, "Wiping...").await
}

/// Collect the confirmation payload, prompting for a missing phrase when
/// attached to a terminal.
fn trigger_context(policy: &TriggerPolicy, args: &WipeArgs) -> Result<TriggerContext> {
    let phrase = match (&args.phrase, args.method) {
        (Some(phrase), _) => Some(phrase.clone()),
        (None, TriggerMethod::TextConfirmation) if std::io::stdin().is_terminal() => {
            let typed = Input::<String>::new()
                .with_prompt(format!(
                    "Type {} to destroy all data",
                    policy.confirmation_phrase.bold()
                ))
                .allow_empty(true)
                .interact_text()?;
            Some(typed)
        }
        (None, _) => None,
    };

    Ok(TriggerContext {
        phrase,
        held_for: args.hold_ms.map(Duration::from_millis),
    })
}
