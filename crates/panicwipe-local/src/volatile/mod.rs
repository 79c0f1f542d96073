//! Volatile state: memory, clipboard, network cache and model cache.
//!
//! Configured stages always run in this order:
//!
//! 1. [`MemoryZeroing`]
//! 2. [`ClipboardClear`]
//! 3. [`NetworkCacheClear`]
//! 4. [`ModelCacheRemoval`]

mod clipboard;
mod memory;
mod model_cache;
mod network_cache;

pub use clipboard::{Clipboard, ClipboardClear, CommandClipboard, MemoryClipboard};
pub use memory::{MemoryZeroing, SecretPool};
pub use model_cache::ModelCacheRemoval;
pub use network_cache::NetworkCacheClear;

use panicwipe_core::WipeStage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Regular files under `dir`, walked on the blocking pool.
///
/// Symlinks are not followed. A missing directory yields nothing.
pub(crate) async fn regular_files(dir: &Path) -> Vec<PathBuf> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        WalkDir::new(&dir)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .collect::<Vec<_>>()
    })
    .await
    .unwrap_or_default()
}

/// The volatile stages, bundled in their fixed order.
///
/// Memory and network cache always run. Clipboard and model cache are
/// only present when the host has something for them to act on.
pub struct VolatileStateCleaner {
    memory: Arc<dyn WipeStage>,
    clipboard: Option<Arc<dyn WipeStage>>,
    network_cache: Arc<dyn WipeStage>,
    model_cache: Option<Arc<dyn WipeStage>>,
}

impl VolatileStateCleaner {
    /// Bundle the two stages every host has
    #[must_use]
    pub fn new(memory: MemoryZeroing, network_cache: NetworkCacheClear) -> Self {
        Self {
            memory: Arc::new(memory),
            clipboard: None,
            network_cache: Arc::new(network_cache),
            model_cache: None,
        }
    }

    /// Add the clipboard stage
    #[must_use]
    pub fn with_clipboard(mut self, stage: ClipboardClear) -> Self {
        self.clipboard = Some(Arc::new(stage));
        self
    }

    /// Add the model cache stage
    #[must_use]
    pub fn with_model_cache(mut self, stage: ModelCacheRemoval) -> Self {
        self.model_cache = Some(Arc::new(stage));
        self
    }

    /// Memory zeroing stage
    #[must_use]
    pub fn memory(&self) -> Arc<dyn WipeStage> {
        Arc::clone(&self.memory)
    }

    /// Clipboard clear stage, if configured
    #[must_use]
    pub fn clipboard(&self) -> Option<Arc<dyn WipeStage>> {
        self.clipboard.clone()
    }

    /// Network cache and cookie stage
    #[must_use]
    pub fn network_cache(&self) -> Arc<dyn WipeStage> {
        Arc::clone(&self.network_cache)
    }

    /// Model cache removal stage, if configured
    #[must_use]
    pub fn model_cache(&self) -> Option<Arc<dyn WipeStage>> {
        self.model_cache.clone()
    }
}
