use std::borrow::Cow;

use crate::errors::Result;
use crate::provider::ContentProvider;

/// Provider over bytes already resident in memory.
///
/// The backing bytes are either borrowed for the program lifetime
/// (embedded assets) or owned by the provider and released with it.
/// Large owned payloads defeat the point of chunked delivery; prefer
/// a file-backed provider for anything that does not already live in
/// RAM.
pub struct MemoryProvider {
    data: Cow<'static, [u8]>,
    mime: String,
}

impl MemoryProvider {
    /// Provider over borrowed bytes.
    pub fn borrowed(data: &'static [u8], mime: &str) -> Self {
        Self {
            data: Cow::Borrowed(data),
            mime: mime.to_string(),
        }
    }

    /// Provider taking ownership of the bytes.
    pub fn owned(data: Vec<u8>, mime: &str) -> Self {
        Self {
            data: Cow::Owned(data),
            mime: mime.to_string(),
        }
    }
}

impl ContentProvider for MemoryProvider {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= self.data.len() as u64 {
            return Ok(0);
        }

        let start = offset as usize;
        let count = buf.len().min(self.data.len() - start);
        buf[..count].copy_from_slice(&self.data[start..start + count]);
        Ok(count)
    }

    fn total_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn rewind(&mut self) -> Result<()> {
        // nothing to rewind, reads carry their own offset
        Ok(())
    }

    fn is_ready(&self) -> bool {
        !self.data.is_empty()
    }
}
