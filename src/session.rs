use std::time::{Duration, Instant};

use crate::errors::StreamError;
use crate::provider::ContentProvider;

/// Progress callback: cumulative bytes delivered and the total size.
pub type ProgressFn = Box<dyn FnMut(u64, u64)>;

/// One in-flight delivery of a provider's content.
///
/// The session owns its provider exclusively; the host transport
/// pulls chunks one call at a time and stops at the first zero
/// return. Content length and MIME type are captured up front so the
/// transport can declare them before the first chunk is requested.
pub struct StreamSession {
    label: String,
    provider: Option<Box<dyn ContentProvider>>,
    chunk_capacity: usize,
    total_size: u64,
    mime: String,
    bytes_transferred: u64,
    started_at: Instant,
    deadline: Option<Duration>,
    progress: Option<ProgressFn>,
}

impl StreamSession {
    pub(crate) fn new(
        label: &str,
        provider: Box<dyn ContentProvider>,
        chunk_capacity: usize,
        deadline: Option<Duration>,
        progress: Option<ProgressFn>,
    ) -> Self {
        let total_size = provider.total_size();
        let mime = provider.mime_type().to_string();
        log::debug!(
            "session/{}: opened, {} bytes of {}",
            label,
            total_size,
            mime
        );

        Self {
            label: label.to_string(),
            provider: Some(provider),
            chunk_capacity,
            total_size,
            mime,
            bytes_transferred: 0,
            started_at: Instant::now(),
            deadline,
            progress,
        }
    }

    /// Content length, declared before the first chunk is pulled.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// MIME type of the content being delivered.
    pub fn mime_type(&self) -> &str {
        &self.mime
    }

    /// Bytes delivered so far.
    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    /// Whether the delivery can still produce chunks.
    pub fn is_active(&self) -> bool {
        self.provider.is_some()
    }

    /// Fill `out` with the next chunk at `offset`.
    ///
    /// Writes at most `min(chunk capacity, out.len())` bytes and
    /// returns the count; `0` ends the delivery. Failures and an
    /// expired deadline are logged and collapse into the terminal
    /// zero — the transport contract knows only byte counts.
    pub fn next_chunk(&mut self, out: &mut [u8], offset: u64) -> usize {
        if self.provider.is_none() {
            return 0;
        }

        if let Some(deadline) = self.deadline {
            if self.started_at.elapsed() > deadline {
                log::warn!(
                    "session/{}: {}",
                    self.label,
                    StreamError::Timeout(deadline)
                );
                self.provider = None;
                return 0;
            }
        }

        let chunk = self.chunk_capacity.min(out.len());
        let provider = match self.provider.as_mut() {
            Some(provider) => provider,
            None => return 0,
        };
        match provider.read_at(&mut out[..chunk], offset) {
            Ok(0) => {
                log::debug!(
                    "session/{}: complete, {} bytes delivered",
                    self.label,
                    self.bytes_transferred
                );
                self.provider = None;
                0
            }
            Ok(count) => {
                self.bytes_transferred += count as u64;
                if let Some(progress) = self.progress.as_mut() {
                    progress(offset + count as u64, self.total_size);
                }
                count
            }
            Err(err) => {
                log::error!(
                    "session/{}: read failed at offset {}: {}",
                    self.label,
                    offset,
                    err
                );
                self.provider = None;
                0
            }
        }
    }

    /// Abort the delivery and release the provider immediately.
    ///
    /// No further reads can happen; subsequent [`next_chunk`] calls
    /// return `0`.
    ///
    /// [`next_chunk`]: StreamSession::next_chunk
    pub fn cancel(&mut self) {
        if self.provider.take().is_some() {
            log::debug!(
                "session/{}: cancelled after {} bytes",
                self.label,
                self.bytes_transferred
            );
        }
    }
}
