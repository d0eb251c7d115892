use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StreamError};

/// Chunk capacity substituted when a caller passes `0`.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;
/// Smallest accepted chunk capacity.
pub const MIN_CHUNK_SIZE: usize = 512;
/// Largest accepted chunk capacity.
pub const MAX_CHUNK_SIZE: usize = 8192;
/// Default per-delivery deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const CONFIG_VERSION: i32 = 1;

/// Delivery configuration passed into [`StreamControl`] construction.
///
/// There is deliberately no process-wide default: every control
/// instance captures its own immutable copy, so unrelated sessions
/// share no mutable state.
///
/// [`StreamControl`]: crate::control::StreamControl
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Chunk capacity used for routes registered with size `0`.
    pub chunk_size: usize,
    /// Per-delivery deadline in milliseconds; `0` disables the check.
    pub timeout_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// On-disk representation of a [`StreamConfig`] document.
#[derive(Serialize, Deserialize)]
struct ConfigData {
    version: i32,
    config: StreamConfig,
}

impl StreamConfig {
    /// Check that the configured default chunk size is itself within
    /// the accepted bounds.
    pub fn validate(&self) -> Result<()> {
        self.resolve_chunk_size(self.chunk_size)?;
        Ok(())
    }

    /// Deadline for a single delivery, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }

    /// Resolve a caller-supplied chunk size against the bounds.
    ///
    /// `0` means "use the configured default". Anything outside
    /// [`MIN_CHUNK_SIZE`]..=[`MAX_CHUNK_SIZE`] is rejected.
    pub fn resolve_chunk_size(&self, requested: usize) -> Result<usize> {
        let size = if requested == 0 {
            self.chunk_size
        } else {
            requested
        };
        if size < MIN_CHUNK_SIZE {
            return Err(StreamError::BufferTooSmall(size));
        }
        if size > MAX_CHUNK_SIZE {
            return Err(StreamError::BufferTooLarge(size));
        }
        Ok(size)
    }

    /// Read a configuration document from disk.
    pub fn read_fs<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StreamError::NotFound(path.display().to_string()));
        }

        let file = fs::File::open(path)?;
        let data: ConfigData =
            serde_json::from_reader(file).map_err(|err| {
                StreamError::InvalidParameter(err.to_string())
            })?;
        if data.version != CONFIG_VERSION {
            return Err(StreamError::InvalidParameter(format!(
                "config version mismatch: expected {}, got {}",
                CONFIG_VERSION, data.version
            )));
        }

        log::debug!(
            "config: loaded from {}: chunk_size={}, timeout_ms={}",
            path.display(),
            data.config.chunk_size,
            data.config.timeout_ms
        );
        Ok(data.config)
    }

    /// Persist the configuration document to disk.
    pub fn write_fs<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = ConfigData {
            version: CONFIG_VERSION,
            config: self.clone(),
        };
        let value = serde_json::to_string(&data)
            .map_err(|err| StreamError::InvalidParameter(err.to_string()))?;
        fs::write(path, value)?;
        Ok(())
    }
}
