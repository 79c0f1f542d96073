//! Sensitive in-process buffers and the memory zeroing stage.

use async_trait::async_trait;
use panicwipe_core::{StageOutcome, WipeStage};
use ring::rand::SystemRandom;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::LocalResult;
use crate::shred::overwrite_buffer;

/// Process-wide registry of buffers holding secrets.
///
/// Cloning yields another handle to the same pool. Components that decrypt
/// or download secrets register them here so the wipe can reach them.
#[derive(Debug, Clone, Default)]
pub struct SecretPool {
    buffers: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl SecretPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand a buffer to the pool
    pub fn register(&self, secret: impl Into<Vec<u8>>) {
        self.lock().push(secret.into());
    }

    /// Number of registered buffers
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no buffer is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes held
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.lock().iter().map(Vec::len).sum()
    }

    /// Overwrite every buffer `passes` times, then release them.
    ///
    /// Returns `(buffers, bytes)` zeroed.
    pub fn zeroize_all(&self, passes: u32) -> LocalResult<(usize, usize)> {
        let rng = SystemRandom::new();
        let mut buffers = self.lock();
        let count = buffers.len();
        let mut bytes = 0;

        for buf in buffers.iter_mut() {
            // Capacity beyond len may hold stale copies from reallocation.
            buf.resize(buf.capacity(), 0);
            overwrite_buffer(buf, passes, &rng)?;
            bytes += buf.len();
            buf.clear();
            buf.shrink_to_fit();
        }
        buffers.clear();
        buffers.shrink_to_fit();

        Ok((count, bytes))
    }

    // A panic elsewhere must not keep secrets alive.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Zeroes the [`SecretPool`] and lets the allocator settle.
///
/// Counts one unit when at least one buffer was zeroed. An empty pool is a
/// clean no-op.
///
/// Best effort only: the OS may already have swapped or copied pages, so
/// this reduces exposure rather than guaranteeing physical erasure.
pub struct MemoryZeroing {
    pool: SecretPool,
    passes: u32,
    settle: Duration,
}

impl MemoryZeroing {
    /// Zero `pool` with `passes` overwrite passes, then wait `settle`
    #[must_use]
    pub const fn new(pool: SecretPool, passes: u32, settle: Duration) -> Self {
        Self {
            pool,
            passes,
            settle,
        }
    }
}

#[async_trait]
impl WipeStage for MemoryZeroing {
    fn name(&self) -> &'static str {
        "memory zeroing"
    }

    async fn destroy(&self) -> StageOutcome {
        match self.pool.zeroize_all(self.passes) {
            Ok((0, _)) => {
                debug!("no sensitive buffers registered");
                StageOutcome::done(0)
            }
            Ok((buffers, bytes)) => {
                info!(buffers, bytes, passes = self.passes, "zeroed sensitive buffers");
                if !self.settle.is_zero() {
                    debug!(settle_ms = self.settle.as_millis(), "settling");
                    tokio::time::sleep(self.settle).await;
                }
                StageOutcome::done(1)
            }
            Err(e) => StageOutcome::failed(e.to_string()),
        }
    }

    async fn survey(&self) -> StageOutcome {
        let count = self.pool.len();
        if count == 0 {
            return StageOutcome::default();
        }
        StageOutcome::surveyed(vec![format!(
            "memory: {count} sensitive buffers ({} bytes)",
            self.pool.total_bytes()
        )])
    }
}
