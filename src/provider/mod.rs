//! Content sources for chunked delivery.
//!
//! Every source implements [`ContentProvider`]; decorating and
//! composing providers ([`CompositeProvider`], [`ChecksumProvider`])
//! keeps the transport-facing surface a single trait object.

mod buffered;
mod checksum;
mod composite;
mod file;
mod generator;
mod memory;
mod retry;

pub use buffered::BufferedProvider;
pub use checksum::ChecksumProvider;
pub use composite::CompositeProvider;
pub use file::FileProvider;
pub use generator::GeneratorProvider;
pub use memory::MemoryProvider;
pub use retry::{FileSource, RetryingProvider, SourceFactory, RETRY_LIMIT};

use crate::errors::Result;

/// Offset-addressable content source with a declared total size and
/// MIME type.
///
/// A read at `offset >= total_size()` returns `Ok(0)`; that is the
/// only meaning of a zero return. Failures come back as `Err` instead
/// of being folded into the zero, so callers can tell end-of-content
/// from a fault. Reads are idempotent for a given offset while no
/// [`rewind`](ContentProvider::rewind) has occurred, and never block
/// longer than one underlying storage operation.
pub trait ContentProvider {
    /// Read up to `buf.len()` bytes of content at `offset` into `buf`,
    /// returning how many were written.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Total content size in bytes, fixed for the provider's lifetime.
    fn total_size(&self) -> u64;

    /// MIME type of the content.
    fn mime_type(&self) -> &str;

    /// Rewind the provider to the beginning of its content.
    fn rewind(&mut self) -> Result<()>;

    /// Whether the provider can serve reads.
    fn is_ready(&self) -> bool;
}
