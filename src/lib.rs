//! Chunked content delivery for memory-constrained hosts.
//!
//! Content lives behind [`ContentProvider`] implementations — memory,
//! procedural generators, plain or windowed files, retrying wrappers
//! and composites — and a [`StreamSession`] feeds it to a pull-based
//! transport in bounded chunks, so the full payload never has to fit
//! in RAM.

pub mod config;
pub mod control;
pub mod errors;
pub mod mime;
pub mod provider;
pub mod session;

pub use config::{
    StreamConfig, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT_MS, MAX_CHUNK_SIZE,
    MIN_CHUNK_SIZE,
};
pub use control::{Method, ProgressHook, RouteOptions, StreamControl};
pub use errors::{Result, StreamError};
pub use provider::{
    BufferedProvider, ChecksumProvider, CompositeProvider,
    ContentProvider, FileProvider, FileSource, GeneratorProvider,
    MemoryProvider, RetryingProvider, SourceFactory, RETRY_LIMIT,
};
pub use session::{ProgressFn, StreamSession};
