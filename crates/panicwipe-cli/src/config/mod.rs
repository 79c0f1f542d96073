//! Configuration file location.

use anyhow::Result;
use directories::ProjectDirs;
use panicwipe::WipeConfig;
use std::path::{Path, PathBuf};

/// Get the default config file path.
pub fn default_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "panicwipe", "pwipe")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(dirs.config_dir().join("config.toml"))
}

/// Resolve `--config`, falling back to the default location.
pub fn resolve(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit.map_or_else(default_path, |p| Ok(p.to_path_buf()))
}

/// Load the config at `path`, or defaults if it does not exist.
pub fn load(path: &Path) -> Result<WipeConfig> {
    Ok(WipeConfig::load(path)?)
}

/// Starting point written by `pwipe config init`.
pub fn template() -> WipeConfig {
    let mut config = WipeConfig::default();
    config.secure_storage.namespaces = vec!["pwipe".to_string()];
    config
}
