use crate::errors::Result;
use crate::provider::ContentProvider;

/// Provider that produces content procedurally.
///
/// Chunk production is delegated to a pure function of
/// `(buffer, offset)`; the provider holds no other state, which is
/// what makes arbitrarily large content possible on hosts that could
/// never hold it in memory.
pub struct GeneratorProvider {
    generator: Box<dyn Fn(&mut [u8], u64) -> usize>,
    total_size: u64,
    mime: String,
}

impl GeneratorProvider {
    /// Provider over a chunk function declaring `total_size` bytes of
    /// content.
    ///
    /// The function fills as much of the buffer as it wants for the
    /// given offset and returns the byte count; its output is clamped
    /// so the provider never reports more than the declared total.
    pub fn new(
        generator: impl Fn(&mut [u8], u64) -> usize + 'static,
        total_size: u64,
        mime: &str,
    ) -> Self {
        Self {
            generator: Box::new(generator),
            total_size,
            mime: mime.to_string(),
        }
    }
}

impl ContentProvider for GeneratorProvider {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= self.total_size {
            return Ok(0);
        }

        let remaining = self.total_size - offset;
        let limit = (buf.len() as u64).min(remaining) as usize;
        let written = (self.generator)(&mut buf[..limit], offset);
        Ok(written.min(limit))
    }

    fn total_size(&self) -> u64 {
        self.total_size
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn rewind(&mut self) -> Result<()> {
        // generation is a function of offset alone
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}
