//! TOML configuration for a wipe deployment.

use panicwipe_core::{Result, TriggerMethod, TriggerPolicy, WipeError, DEFAULT_CONFIRMATION_PHRASE};
use panicwipe_local::{
    Clipboard, ClipboardClear, CommandClipboard, MemoryZeroing, ModelCacheRemoval,
    NetworkCacheClear, SecretPool, SecretToolStore, SecureStorageClient, SecureStore,
    VolatileStateCleaner,
};
use panicwipe_remote::{RemoteWipeClient, DEFAULT_WIPE_PATH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::orchestrator::{Orchestrator, OrchestratorBuilder, WipeSettings};

/// Complete deployment configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipeConfig {
    /// Run-wide behaviour
    #[serde(default)]
    pub wipe: WipeSection,

    /// Locations of on-disk state
    #[serde(default)]
    pub paths: PathsSection,

    /// Credential namespaces to purge
    #[serde(default)]
    pub secure_storage: SecureStorageSection,

    /// Backend wipe endpoint
    #[serde(default)]
    pub remote: RemoteSection,

    /// Trigger confirmation rules
    #[serde(default)]
    pub trigger: TriggerSection,
}

/// `[wipe]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipeSection {
    /// Perform destructive actions (default: off in debug builds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive: Option<bool>,

    /// Refuse instead of simulating when destructive actions are off
    #[serde(default)]
    pub refuse_when_disabled: bool,

    /// Overwrite passes for files and buffers
    #[serde(default = "default_passes")]
    pub passes: u32,

    /// Upper bound on any single stage (seconds)
    #[serde(default = "default_stage_deadline")]
    pub stage_deadline_secs: u64,

    /// Pause after memory zeroing (milliseconds)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Clear the system clipboard
    #[serde(default = "default_true")]
    pub clipboard: bool,

    /// Report a non-empty clipboard after clearing as an error
    #[serde(default)]
    pub escalate_clipboard_verification: bool,
}

/// `[paths]`. `~` is expanded on use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsSection {
    /// Directory of locally cached model artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_cache_dir: Option<String>,

    /// HTTP response cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_cache_dir: Option<String>,

    /// Persisted cookie jar file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_jar: Option<String>,
}

/// `[secure_storage]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureStorageSection {
    /// Namespaces whose accounts are all deleted
    #[serde(default)]
    pub namespaces: Vec<String>,

    /// Also bulk-delete the network password category
    #[serde(default = "default_true")]
    pub network_credentials: bool,
}

/// `[remote]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSection {
    /// Backend base URL; no remote wipe without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Endpoint path relative to the base URL
    #[serde(default = "default_wipe_path")]
    pub path: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Request timeout (seconds)
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

/// `[trigger]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSection {
    /// Exact phrase for text confirmation
    #[serde(default = "default_phrase")]
    pub confirmation_phrase: String,

    /// Minimum key-combo hold (milliseconds)
    #[serde(default = "default_min_hold_ms")]
    pub min_hold_ms: u64,

    /// Methods that also request a backend wipe
    #[serde(default = "default_remote_wipe_on")]
    pub remote_wipe_on: Vec<TriggerMethod>,
}

impl Default for WipeSection {
    fn default() -> Self {
        Self {
            destructive: None,
            refuse_when_disabled: false,
            passes: default_passes(),
            stage_deadline_secs: default_stage_deadline(),
            settle_ms: default_settle_ms(),
            clipboard: true,
            escalate_clipboard_verification: false,
        }
    }
}

impl Default for SecureStorageSection {
    fn default() -> Self {
        Self {
            namespaces: Vec::new(),
            network_credentials: true,
        }
    }
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            base_url: None,
            path: default_wipe_path(),
            token_env: default_token_env(),
            timeout_secs: default_remote_timeout(),
        }
    }
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            confirmation_phrase: default_phrase(),
            min_hold_ms: default_min_hold_ms(),
            remote_wipe_on: default_remote_wipe_on(),
        }
    }
}

impl WipeConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WipeError::Config(e.to_string()))
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| WipeError::Config(e.to_string()))
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Set one dotted key, e.g. `wipe.passes` or `trigger.remote_wipe_on`.
    ///
    /// List values are comma separated.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "wipe.destructive" => self.wipe.destructive = Some(parse(key, value)?),
            "wipe.refuse_when_disabled" => self.wipe.refuse_when_disabled = parse(key, value)?,
            "wipe.passes" => self.wipe.passes = parse(key, value)?,
            "wipe.stage_deadline_secs" => self.wipe.stage_deadline_secs = parse(key, value)?,
            "wipe.settle_ms" => self.wipe.settle_ms = parse(key, value)?,
            "wipe.clipboard" => self.wipe.clipboard = parse(key, value)?,
            "wipe.escalate_clipboard_verification" => {
                self.wipe.escalate_clipboard_verification = parse(key, value)?;
            }
            "paths.model_cache_dir" => self.paths.model_cache_dir = non_empty(value),
            "paths.http_cache_dir" => self.paths.http_cache_dir = non_empty(value),
            "paths.cookie_jar" => self.paths.cookie_jar = non_empty(value),
            "secure_storage.namespaces" => self.secure_storage.namespaces = split_list(value),
            "secure_storage.network_credentials" => {
                self.secure_storage.network_credentials = parse(key, value)?;
            }
            "remote.base_url" => self.remote.base_url = non_empty(value),
            "remote.path" => self.remote.path = value.to_string(),
            "remote.token_env" => self.remote.token_env = value.to_string(),
            "remote.timeout_secs" => self.remote.timeout_secs = parse(key, value)?,
            "trigger.confirmation_phrase" => {
                if value.trim().is_empty() {
                    return Err(WipeError::Config(
                        "trigger.confirmation_phrase cannot be empty".to_string(),
                    ));
                }
                self.trigger.confirmation_phrase = value.to_string();
            }
            "trigger.min_hold_ms" => self.trigger.min_hold_ms = parse(key, value)?,
            "trigger.remote_wipe_on" => {
                self.trigger.remote_wipe_on = split_list(value)
                    .iter()
                    .map(|m| m.parse::<TriggerMethod>().map_err(WipeError::Config))
                    .collect::<Result<_>>()?;
            }
            _ => return Err(WipeError::Config(format!("unknown config key: {key}"))),
        }
        Ok(())
    }

    /// Confirmation rules for the trigger layer
    #[must_use]
    pub fn trigger_policy(&self) -> TriggerPolicy {
        TriggerPolicy {
            confirmation_phrase: self.trigger.confirmation_phrase.clone(),
            min_hold: Duration::from_millis(self.trigger.min_hold_ms),
            remote_wipe_on: self.trigger.remote_wipe_on.clone(),
        }
    }

    /// Orchestrator settings, resolving the build-dependent default
    #[must_use]
    pub fn settings(&self) -> WipeSettings {
        WipeSettings {
            destructive: self.wipe.destructive.unwrap_or(!cfg!(debug_assertions)),
            refuse_when_disabled: self.wipe.refuse_when_disabled,
            passes: self.wipe.passes,
            stage_deadline: Duration::from_secs(self.wipe.stage_deadline_secs),
        }
    }

    /// Configured model cache directory, expanded
    #[must_use]
    pub fn model_cache_dir(&self) -> Option<PathBuf> {
        self.paths.model_cache_dir.as_deref().map(expand_path)
    }

    /// Configured HTTP cache directory, expanded
    #[must_use]
    pub fn http_cache_dir(&self) -> Option<PathBuf> {
        self.paths.http_cache_dir.as_deref().map(expand_path)
    }

    /// Configured cookie jar, expanded
    #[must_use]
    pub fn cookie_jar(&self) -> Option<PathBuf> {
        self.paths.cookie_jar.as_deref().map(expand_path)
    }

    /// Build the backend client.
    ///
    /// `Ok(None)` when no base URL is configured. A missing token is an
    /// error so callers can decide whether to continue without it.
    pub fn remote_client(&self) -> Result<Option<RemoteWipeClient>> {
        let Some(base_url) = self.remote.base_url.as_deref() else {
            return Ok(None);
        };
        let token = std::env::var(&self.remote.token_env).map_err(|_| {
            WipeError::Config(format!(
                "remote wipe token: environment variable {} is not set",
                self.remote.token_env
            ))
        })?;

        RemoteWipeClient::builder(base_url, token)
            .path(self.remote.path.clone())
            .timeout(Duration::from_secs(self.remote.timeout_secs))
            .build()
            .map(Some)
    }

    /// Assemble stages from this config around explicit collaborators.
    ///
    /// The volatile stages come from one [`VolatileStateCleaner`]. Its
    /// clipboard stage is omitted when `clipboard` is `None` or disabled, and
    /// its model cache stage when no directory is configured. The secure
    /// storage stage is omitted when there is nothing for it to purge.
    pub fn orchestrator_builder(
        &self,
        pool: SecretPool,
        store: Arc<dyn SecureStore>,
        clipboard: Option<Arc<dyn Clipboard>>,
    ) -> Result<OrchestratorBuilder> {
        let passes = self.wipe.passes;
        let mut volatile = VolatileStateCleaner::new(
            MemoryZeroing::new(pool, passes, Duration::from_millis(self.wipe.settle_ms)),
            NetworkCacheClear::new(self.http_cache_dir(), self.cookie_jar(), passes),
        );

        if let Some(clipboard) = clipboard.filter(|_| self.wipe.clipboard) {
            volatile = volatile.with_clipboard(
                ClipboardClear::new(clipboard)
                    .escalate_verification(self.wipe.escalate_clipboard_verification),
            );
        }

        if let Some(dir) = self.model_cache_dir() {
            volatile = volatile.with_model_cache(ModelCacheRemoval::new(dir, passes));
        }

        let mut builder = Orchestrator::builder()
            .settings(self.settings())
            .volatile(&volatile);

        let storage = &self.secure_storage;
        if !storage.namespaces.is_empty() || storage.network_credentials {
            builder = builder.secure_storage(Arc::new(
                SecureStorageClient::new(store, storage.namespaces.clone())
                    .network_credentials(storage.network_credentials),
            ));
        }

        match self.remote_client() {
            Ok(Some(client)) => builder = builder.remote(Arc::new(client)),
            Ok(None) => debug!("no remote wipe endpoint configured"),
            Err(WipeError::Config(reason)) => warn!(%reason, "remote wipe unavailable"),
            Err(e) => return Err(e),
        }

        Ok(builder)
    }
}

impl Orchestrator {
    /// Build the process orchestrator from `config`, using the system
    /// secret service and clipboard.
    pub fn from_config(config: &WipeConfig, pool: SecretPool) -> Result<Self> {
        let clipboard: Option<Arc<dyn Clipboard>> = if config.wipe.clipboard {
            match CommandClipboard::detect() {
                Ok(clipboard) => Some(Arc::new(clipboard)),
                Err(e) => {
                    warn!(error = %e, "no system clipboard, skipping clipboard stage");
                    None
                }
            }
        } else {
            None
        };

        Ok(config
            .orchestrator_builder(pool, Arc::new(SecretToolStore::new()), clipboard)?
            .build())
    }
}

/// Expand a leading `~` to the home directory
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| WipeError::Config(format!("{key}: invalid value {value:?}: {e}")))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// Default value functions for serde.
const fn default_passes() -> u32 {
    3
}

const fn default_stage_deadline() -> u64 {
    120
}

const fn default_settle_ms() -> u64 {
    250
}

const fn default_true() -> bool {
    true
}

const fn default_remote_timeout() -> u64 {
    30
}

const fn default_min_hold_ms() -> u64 {
    3000
}

fn default_wipe_path() -> String {
    String::from(DEFAULT_WIPE_PATH)
}

fn default_token_env() -> String {
    String::from("PANICWIPE_TOKEN")
}

fn default_phrase() -> String {
    String::from(DEFAULT_CONFIRMATION_PHRASE)
}

fn default_remote_wipe_on() -> Vec<TriggerMethod> {
    TriggerPolicy::default().remote_wipe_on
}
