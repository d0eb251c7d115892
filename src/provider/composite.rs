use crate::errors::{Result, StreamError};
use crate::mime::OCTET_STREAM;
use crate::provider::ContentProvider;

/// One sub-provider mapped into the composite address space.
struct Part {
    provider: Box<dyn ContentProvider>,
    start_offset: u64,
    size: u64,
}

/// Provider concatenating sub-providers into one contiguous range.
///
/// Parts are owned by the composite and addressed by a running start
/// offset, so the list is always sorted, contiguous and
/// non-overlapping. A single read never spans two parts; a caller
/// wanting more issues a follow-up read at the advanced offset.
pub struct CompositeProvider {
    parts: Vec<Part>,
    total_size: u64,
    mime: String,
}

impl CompositeProvider {
    pub fn new(mime: &str) -> Self {
        Self {
            parts: Vec::new(),
            total_size: 0,
            mime: mime.to_string(),
        }
    }

    /// Append a ready sub-provider; its content follows everything
    /// added before it.
    ///
    /// A not-ready sub-provider is rejected and the composite is left
    /// unchanged.
    pub fn add_part(
        &mut self,
        provider: Box<dyn ContentProvider>,
    ) -> Result<()> {
        if !provider.is_ready() {
            return Err(StreamError::Provider(
                "composite".to_owned(),
                "sub-provider is not ready".to_owned(),
            ));
        }

        let size = provider.total_size();
        self.parts.push(Part {
            provider,
            start_offset: self.total_size,
            size,
        });
        self.total_size += size;
        Ok(())
    }

    /// Number of parts added so far.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

impl Default for CompositeProvider {
    fn default() -> Self {
        Self::new(OCTET_STREAM)
    }
}

impl ContentProvider for CompositeProvider {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= self.total_size {
            return Ok(0);
        }

        // first part whose end lies beyond the offset owns it; the
        // list is sorted by start_offset, so binary search applies
        let index = self
            .parts
            .partition_point(|part| part.start_offset + part.size <= offset);
        let part = &mut self.parts[index];

        let local = offset - part.start_offset;
        let limit = (buf.len() as u64).min(part.size - local) as usize;
        part.provider.read_at(&mut buf[..limit], local)
    }

    fn total_size(&self) -> u64 {
        self.total_size
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn rewind(&mut self) -> Result<()> {
        for part in &mut self.parts {
            part.provider.rewind()?;
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}
