//! `pwipe audit` - simulated run that lists what a wipe would destroy.

use anyhow::Result;
use panicwipe::{Orchestrator, SecretPool, TriggerContext, TriggerMethod, WipeError};
use std::process::ExitCode;

use super::{run_report, Context};
use crate::config;

pub async fn execute(ctx: Context) -> Result<ExitCode> {
    let mut config = config::load(&ctx.config_path)?;
    config.wipe.destructive = Some(false);
    config.wipe.refuse_when_disabled = false;

    let trigger = config
        .trigger_policy()
        .validate(TriggerMethod::PanicButton, TriggerContext::none())
        .map_err(WipeError::from)?;

    let orchestrator = Orchestrator::from_config(&config, SecretPool::new())?;
    run_report(&ctx, &orchestrator, &trigger, "Surveying...").await
}
