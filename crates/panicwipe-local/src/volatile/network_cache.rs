//! HTTP response cache and cookie jar destruction.

use async_trait::async_trait;
use panicwipe_core::{StageOutcome, WipeStage};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::regular_files;
use crate::error::LocalResult;
use crate::shred::shred_file;

/// Clears the shared transport cache: cached responses and stored cookies.
#[derive(Debug, Clone)]
pub struct NetworkCacheClear {
    cache_dir: Option<PathBuf>,
    cookie_jar: Option<PathBuf>,
    passes: u32,
}

impl NetworkCacheClear {
    /// Clear `cache_dir` and `cookie_jar`; either may be unset
    #[must_use]
    pub const fn new(cache_dir: Option<PathBuf>, cookie_jar: Option<PathBuf>, passes: u32) -> Self {
        Self {
            cache_dir,
            cookie_jar,
            passes,
        }
    }

    /// Remove every cached response and leave an empty directory behind.
    ///
    /// Returns `true` if there was a cache to clear.
    async fn clear_responses(dir: &Path) -> LocalResult<bool> {
        if !tokio::fs::try_exists(dir).await? {
            return Ok(false);
        }
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(dir).await?;
        Ok(true)
    }
}

#[async_trait]
impl WipeStage for NetworkCacheClear {
    fn name(&self) -> &'static str {
        "network cache clear"
    }

    async fn destroy(&self) -> StageOutcome {
        let mut units = 0;
        let mut failures = Vec::new();

        if let Some(dir) = &self.cache_dir {
            match Self::clear_responses(dir).await {
                Ok(true) => {
                    info!(path = %dir.display(), "cleared response cache");
                    units += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "response cache clear failed");
                    failures.push(format!("responses: {e}"));
                }
            }
        }

        if let Some(jar) = &self.cookie_jar {
            match shred_file(jar, self.passes).await {
                Ok(true) => {
                    info!(path = %jar.display(), "destroyed cookie jar");
                    units += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %jar.display(), error = %e, "cookie jar destruction failed");
                    failures.push(format!("cookies: {e}"));
                }
            }
        }

        let outcome = StageOutcome::done(units);
        if failures.is_empty() {
            outcome
        } else {
            outcome.with_error(failures.join("; "))
        }
    }

    async fn survey(&self) -> StageOutcome {
        let mut identified = Vec::new();

        if let Some(dir) = &self.cache_dir {
            let files = regular_files(dir).await.len();
            if files > 0 {
                identified.push(format!(
                    "http cache: {files} cached responses under {}",
                    dir.display()
                ));
            }
        }
        if let Some(jar) = &self.cookie_jar {
            if tokio::fs::try_exists(jar).await.unwrap_or(false) {
                identified.push(format!("cookies: {}", jar.display()));
            }
        }

        StageOutcome::surveyed(identified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clears_responses_and_cookies() {
        let root = tempfile::tempdir().unwrap();
        let cache = root.path().join("http-cache");
        std::fs::create_dir_all(cache.join("ab")).unwrap();
        std::fs::write(cache.join("ab").join("entry1"), b"HTTP/1.1 200").unwrap();
        let jar = root.path().join("cookies.json");
        std::fs::write(&jar, br#"{"session":"abc"}"#).unwrap();

        let stage = NetworkCacheClear::new(Some(cache.clone()), Some(jar.clone()), 1);
        let survey = stage.survey().await;
        assert_eq!(survey.identified.len(), 2);

        let outcome = stage.destroy().await;
        assert_eq!(outcome, StageOutcome::done(2));
        assert!(cache.exists());
        assert!(regular_files(&cache).await.is_empty());
        assert!(!jar.exists());
    }

    #[tokio::test]
    async fn absent_targets_are_success() {
        let root = tempfile::tempdir().unwrap();
        let stage = NetworkCacheClear::new(
            Some(root.path().join("missing-cache")),
            Some(root.path().join("missing-cookies")),
            3,
        );
        assert_eq!(stage.destroy().await, StageOutcome::done(0));
        assert!(stage.survey().await.identified.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_stage_is_noop() {
        let stage = NetworkCacheClear::new(None, None, 3);
        assert_eq!(stage.destroy().await, StageOutcome::done(0));
    }

    #[tokio::test]
    async fn both_halves_failing_is_one_combined_error() {
        let root = tempfile::tempdir().unwrap();
        // A file where the cache directory should be, a directory where the jar should be.
        let cache = root.path().join("http-cache");
        std::fs::write(&cache, b"not a directory").unwrap();
        let jar = root.path().join("cookies.json");
        std::fs::create_dir_all(&jar).unwrap();

        let outcome = NetworkCacheClear::new(Some(cache.clone()), Some(jar.clone()), 1)
            .destroy()
            .await;

        assert_eq!(outcome.units, 0);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("responses: "));
        assert!(outcome.errors[0].contains("; cookies: "));
        assert!(cache.is_file());
        assert!(jar.is_dir());
    }

    #[tokio::test]
    async fn one_failing_half_keeps_the_other_unit() {
        let root = tempfile::tempdir().unwrap();
        let cache = root.path().join("http-cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("entry"), b"HTTP/1.1 200").unwrap();
        let jar = root.path().join("cookies.json");
        std::fs::create_dir_all(&jar).unwrap();

        let outcome = NetworkCacheClear::new(Some(cache.clone()), Some(jar), 1)
            .destroy()
            .await;

        assert_eq!(outcome.units, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("cookies: "));
        assert!(regular_files(&cache).await.is_empty());
    }
}
