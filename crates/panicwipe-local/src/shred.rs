//! Overwrite passes for buffers and files.
//!
//! Every pass but the last is random; the last is zeros. Best effort only:
//! journaling filesystems and SSD wear levelling can keep copies that no
//! overwrite reaches.

use ring::rand::{SecureRandom, SystemRandom};
use std::io::SeekFrom;
use std::path::Path;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

use crate::error::{LocalError, LocalResult};

/// Chunk size for streaming file overwrites (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Fill `buf` for pass `pass` of `passes` (1-indexed).
pub fn fill_pass(buf: &mut [u8], pass: u32, passes: u32, rng: &SystemRandom) -> LocalResult<()> {
    if pass >= passes {
        buf.fill(0);
        Ok(())
    } else {
        rng.fill(buf).map_err(|_| LocalError::Random)
    }
}

/// Overwrite a buffer in place and leave it zeroed.
///
/// At least one (zero) pass always runs.
pub fn overwrite_buffer(buf: &mut [u8], passes: u32, rng: &SystemRandom) -> LocalResult<()> {
    let passes = passes.max(1);
    for pass in 1..=passes {
        fill_pass(buf, pass, passes, rng)?;
        // Keep the writes from being optimized away as dead stores.
        std::hint::black_box(&mut *buf);
    }
    Ok(())
}

/// Overwrite a file's contents in place without removing it.
///
/// Returns the number of bytes overwritten per pass.
pub async fn overwrite_file(path: &Path, passes: u32) -> LocalResult<u64> {
    let size = tokio::fs::metadata(path).await?.len();
    if size == 0 || passes == 0 {
        return Ok(size);
    }

    let mut file = tokio::fs::OpenOptions::new().write(true).open(path).await?;
    let rng = SystemRandom::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    for pass in 1..=passes {
        file.seek(SeekFrom::Start(0)).await?;
        let mut remaining = size;

        while remaining > 0 {
            let chunk = usize::try_from(remaining).map_or(CHUNK_SIZE, |r| r.min(CHUNK_SIZE));
            fill_pass(&mut buf[..chunk], pass, passes, &rng)?;
            file.write_all(&buf[..chunk]).await?;
            remaining -= chunk as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
    }

    debug!(path = %path.display(), size, passes, "overwrote file");
    Ok(size)
}

/// Overwrite then delete a single file. A missing file is not an error.
///
/// Returns `true` if a file was removed.
pub async fn shred_file(path: &Path, passes: u32) -> LocalResult<bool> {
    match tokio::fs::try_exists(path).await {
        Ok(false) => return Ok(false),
        Ok(true) => {}
        Err(e) => return Err(e.into()),
    }

    overwrite_file(path, passes).await?;
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
