//! System clipboard access and the clipboard clear stage.

use async_trait::async_trait;
use panicwipe_core::{StageOutcome, WipeStage};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{LocalError, LocalResult};

/// Read-helper stderr that means the clipboard holds nothing
const EMPTY_SELECTION: [&str; 3] = [
    "Nothing is copied",
    "No selection",
    "target STRING not available",
];

/// The shared system clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with nothing
    async fn clear(&self) -> LocalResult<()>;

    /// Read the current text contents; `None` or empty means clear
    async fn read_text(&self) -> LocalResult<Option<String>>;
}

/// Clipboard driven through platform helper programs.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    clear: Vec<String>,
    read: Vec<String>,
}

impl CommandClipboard {
    /// Use explicit clear and read command lines
    #[must_use]
    pub fn new(clear: Vec<String>, read: Vec<String>) -> Self {
        Self { clear, read }
    }

    /// Pick helpers for the current platform and session
    pub fn detect() -> LocalResult<Self> {
        let argv = |parts: &[&str]| parts.iter().map(ToString::to_string).collect::<Vec<_>>();

        if cfg!(target_os = "macos") {
            return Ok(Self::new(argv(&["pbcopy"]), argv(&["pbpaste"])));
        }
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            return Ok(Self::new(
                argv(&["wl-copy", "--clear"]),
                argv(&["wl-paste", "--no-newline"]),
            ));
        }
        if std::env::var_os("DISPLAY").is_some() {
            return Ok(Self::new(
                argv(&["xclip", "-selection", "clipboard", "-i"]),
                argv(&["xclip", "-selection", "clipboard", "-o"]),
            ));
        }
        Err(LocalError::NoClipboard(
            "no macOS, Wayland or X11 session detected".to_string(),
        ))
    }

    fn split(argv: &[String]) -> LocalResult<(&String, &[String])> {
        argv.split_first()
            .ok_or_else(|| LocalError::NoClipboard("empty command line".to_string()))
    }

    /// Run a copy helper with empty stdin, which sets the clipboard to nothing.
    ///
    /// Only the exit status is awaited. `xclip` forks a child that keeps
    /// serving the selection, and that child would hold captured pipes open.
    async fn run_status(argv: &[String]) -> LocalResult<()> {
        let (program, args) = Self::split(argv)?;

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| LocalError::Command {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(LocalError::Command {
                program: program.clone(),
                reason: status.to_string(),
            })
        }
    }

    /// Run a paste helper and capture what it prints.
    async fn run_output(argv: &[String]) -> LocalResult<Vec<u8>> {
        let (program, args) = Self::split(argv)?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| LocalError::Command {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(LocalError::Command {
                program: program.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn clear(&self) -> LocalResult<()> {
        Self::run_status(&self.clear).await
    }

    async fn read_text(&self) -> LocalResult<Option<String>> {
        match Self::run_output(&self.read).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                Ok((!text.is_empty()).then_some(text))
            }
            // Paste helpers exit non-zero on an empty clipboard.
            Err(LocalError::Command { reason, .. })
                if EMPTY_SELECTION.iter().any(|m| reason.contains(m)) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// In-process clipboard for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    repopulate: Option<String>,
}

impl MemoryClipboard {
    /// Empty clipboard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard holding `text`
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(text.into())),
            repopulate: None,
        }
    }

    /// Clipboard that another process refills with `text` right after every clear
    #[must_use]
    pub fn repopulating(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            contents: Mutex::new(Some(text.clone())),
            repopulate: Some(text),
        }
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn clear(&self) -> LocalResult<()> {
        *self.contents.lock().await = self.repopulate.clone();
        Ok(())
    }

    async fn read_text(&self) -> LocalResult<Option<String>> {
        Ok(self.contents.lock().await.clone())
    }
}

/// Clears the clipboard and reads it back.
///
/// A non-empty read-back is advisory: another process may have copied
/// something in between. It is only an error when escalation is enabled.
pub struct ClipboardClear {
    clipboard: Arc<dyn Clipboard>,
    escalate_verification: bool,
}

impl ClipboardClear {
    /// Clear `clipboard`, treating verification failures as warnings
    #[must_use]
    pub fn new(clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            clipboard,
            escalate_verification: false,
        }
    }

    /// Treat a failed read-back as a stage error
    #[must_use]
    pub const fn escalate_verification(mut self, escalate: bool) -> Self {
        self.escalate_verification = escalate;
        self
    }

    fn inconclusive(&self, outcome: StageOutcome, message: String) -> StageOutcome {
        warn!(escalated = self.escalate_verification, "{message}");
        if self.escalate_verification {
            outcome.with_error(message)
        } else {
            outcome.with_warning(message)
        }
    }
}

#[async_trait]
impl WipeStage for ClipboardClear {
    fn name(&self) -> &'static str {
        "clipboard clear"
    }

    async fn destroy(&self) -> StageOutcome {
        if let Err(e) = self.clipboard.clear().await {
            return StageOutcome::failed(e.to_string());
        }
        info!("clipboard cleared");

        let outcome = StageOutcome::done(1);
        match self.clipboard.read_text().await {
            Ok(None) => outcome,
            Ok(Some(text)) if text.is_empty() => outcome,
            Ok(Some(_)) => {
                self.inconclusive(outcome, "clipboard not empty after clear".to_string())
            }
            Err(e) => self.inconclusive(outcome, format!("could not verify clear: {e}")),
        }
    }

    async fn survey(&self) -> StageOutcome {
        match self.clipboard.read_text().await {
            Ok(Some(text)) if !text.is_empty() => {
                debug!(chars = text.chars().count(), "clipboard holds data");
                StageOutcome::surveyed(vec![format!(
                    "clipboard: {} characters",
                    text.chars().count()
                )])
            }
            Ok(_) => StageOutcome::default(),
            Err(e) => StageOutcome::failed(format!("could not read clipboard: {e}")),
        }
    }
}
