use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors surfaced by registration and by provider construction.
///
/// The chunked-read hot path never raises these across the transport
/// boundary: [`StreamSession::next_chunk`] collapses failures into a
/// terminal zero-byte return and logs the error instead.
///
/// [`StreamSession::next_chunk`]: crate::session::StreamSession::next_chunk
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("chunk size {0} is above the allowed maximum")]
    BufferTooLarge(usize),
    #[error("chunk size {0} is below the allowed minimum")]
    BufferTooSmall(usize),
    #[error("provider error: {0} {1}")]
    Provider(String, String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("buffer allocation failed")]
    Allocation,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
