//! Locally cached model artifacts.

use async_trait::async_trait;
use panicwipe_core::{StageOutcome, WipeStage};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::regular_files;
use crate::shred::overwrite_file;

/// Overwrites and removes the on-disk model cache directory.
#[derive(Debug, Clone)]
pub struct ModelCacheRemoval {
    dir: PathBuf,
    passes: u32,
}

impl ModelCacheRemoval {
    /// Remove `dir`, overwriting its files `passes` times first
    #[must_use]
    pub const fn new(dir: PathBuf, passes: u32) -> Self {
        Self { dir, passes }
    }

    /// Overwrite every regular file under the directory.
    ///
    /// Failures are returned as warnings: removal still follows, so the
    /// data is gone from the filesystem even if a block was not rewritten.
    async fn overwrite_tree(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for path in regular_files(&self.dir).await {
            if let Err(e) = overwrite_file(&path, self.passes).await {
                warn!(path = %path.display(), error = %e, "overwrite failed, removing anyway");
                warnings.push(format!("{}: overwrite failed: {e}", path.display()));
            }
        }
        warnings
    }
}

#[async_trait]
impl WipeStage for ModelCacheRemoval {
    fn name(&self) -> &'static str {
        "model cache removal"
    }

    async fn destroy(&self) -> StageOutcome {
        match tokio::fs::try_exists(&self.dir).await {
            Ok(false) => {
                debug!(path = %self.dir.display(), "model cache absent");
                return StageOutcome::done(0);
            }
            Ok(true) => {}
            Err(e) => return StageOutcome::failed(format!("{}: {e}", self.dir.display())),
        }

        let warnings = if self.passes > 0 {
            self.overwrite_tree().await
        } else {
            Vec::new()
        };

        let mut outcome = match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                info!(path = %self.dir.display(), "removed model cache");
                StageOutcome::done(1)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StageOutcome::done(0),
            Err(e) => {
                warn!(path = %self.dir.display(), error = %e, "model cache removal failed");
                StageOutcome::failed(format!("{}: {e}", self.dir.display()))
            }
        };
        outcome.warnings = warnings;
        outcome
    }

    async fn survey(&self) -> StageOutcome {
        if !tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            return StageOutcome::default();
        }
        StageOutcome::surveyed(vec![format!(
            "model cache: {} ({} files)",
            self.dir.display(),
            regular_files(&self.dir).await.len()
        )])
    }
}
