use crc32fast::Hasher;

use crate::errors::Result;
use crate::provider::ContentProvider;

/// Decorator folding delivered bytes into a CRC32 digest.
///
/// Wraps any provider and hashes bytes as they flow out, without a
/// second pass over the source. The digest is only meaningful for an
/// in-order delivery: while every read starts where the previous one
/// ended, [`checksum`](ChecksumProvider::checksum) after a full drain
/// equals the CRC32 of the whole payload. A read that jumps ahead or
/// re-reads earlier content invalidates the digest for the rest of
/// the delivery; [`rewind`](ContentProvider::rewind) starts a fresh
/// one.
pub struct ChecksumProvider {
    inner: Box<dyn ContentProvider>,
    hasher: Hasher,
    hashed_until: u64,
    sequential: bool,
}

impl ChecksumProvider {
    pub fn new(inner: Box<dyn ContentProvider>) -> Self {
        Self {
            inner,
            hasher: Hasher::new(),
            hashed_until: 0,
            sequential: true,
        }
    }

    /// CRC32 of the bytes delivered so far, or `None` once reads went
    /// out of order.
    pub fn checksum(&self) -> Option<u32> {
        if self.sequential {
            Some(self.hasher.clone().finalize())
        } else {
            None
        }
    }

    /// Whether the digest covers the entire content.
    pub fn is_complete(&self) -> bool {
        self.sequential && self.hashed_until == self.inner.total_size()
    }
}

impl ContentProvider for ChecksumProvider {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let count = self.inner.read_at(buf, offset)?;
        if offset == self.hashed_until {
            if self.sequential && count > 0 {
                self.hasher.update(&buf[..count]);
                self.hashed_until += count as u64;
            }
        } else if count > 0 {
            self.sequential = false;
        }
        Ok(count)
    }

    fn total_size(&self) -> u64 {
        self.inner.total_size()
    }

    fn mime_type(&self) -> &str {
        self.inner.mime_type()
    }

    fn rewind(&mut self) -> Result<()> {
        self.inner.rewind()?;
        self.hasher = Hasher::new();
        self.hashed_until = 0;
        self.sequential = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }
}
