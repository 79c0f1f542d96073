//! Command implementations.

pub mod audit;
pub mod config;
pub mod wipe;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use panicwipe::{Orchestrator, ValidatedTrigger, WipeReport};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::output::{print_report, OutputFormat};

/// Exit code for a run whose report contains errors
pub const EXIT_REPORT_FAILED: u8 = 2;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Config file in use
    pub config_path: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// JSON-lines file that receives every finished report
    pub audit_log: Option<PathBuf>,
}

impl Context {
    /// Spinner on stderr, only for interactive pretty output.
    fn spinner(&self, message: &'static str) -> Option<ProgressBar> {
        if self.output_format != OutputFormat::Pretty || !std::io::stderr().is_terminal() {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    }
}

/// Run `trigger` to completion, then print and persist the report.
async fn run_report(
    ctx: &Context,
    orchestrator: &Orchestrator,
    trigger: &ValidatedTrigger,
    message: &'static str,
) -> Result<ExitCode> {
    let spinner = ctx.spinner(message);
    let result = orchestrator.begin_wipe(trigger).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let report = result?;

    print_report(&report, ctx.output_format)?;

    if let Some(path) = &ctx.audit_log {
        append_audit_log(path, &report)
            .with_context(|| format!("writing audit log {}", path.display()))?;
    }

    Ok(exit_code(&report))
}

/// Append `report` as a single JSON line.
pub fn append_audit_log(path: &Path, report: &WipeReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let line = serde_json::to_string(report)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Success only when the report has no errors.
pub fn exit_status(report: &WipeReport) -> u8 {
    if report.success() {
        0
    } else {
        EXIT_REPORT_FAILED
    }
}

fn exit_code(report: &WipeReport) -> ExitCode {
    ExitCode::from(exit_status(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use panicwipe::{ReportDraft, TriggerMethod};

    #[test]
    fn audit_log_appends_one_line_per_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("wipe.jsonl");

        let ok = ReportDraft::start(TriggerMethod::PanicButton, false, 3).finish();
        let mut failed = ReportDraft::start(TriggerMethod::KeyCombo, false, 3);
        failed.push_error("remote wipe", "Backend emergency wipe failed");
        let failed = failed.finish();

        append_audit_log(&path, &ok).unwrap();
        append_audit_log(&path, &failed).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["success"], true);
        assert_eq!(lines[1]["success"], false);
        assert_eq!(lines[1]["trigger"], "key_combo");

        assert_eq!(exit_status(&ok), 0);
        assert_eq!(exit_status(&failed), EXIT_REPORT_FAILED);
    }
}
