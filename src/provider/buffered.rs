use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::config::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::errors::{Result, StreamError};
use crate::mime::mime_for_path;
use crate::provider::ContentProvider;

/// Windowed provider over any seekable byte source.
///
/// Keeps a fixed-capacity window of the source in memory. Reads that
/// land inside the window are served without touching the source; a
/// miss costs exactly one seek and one read. The window is the only
/// allocation the provider makes.
pub struct BufferedProvider<R: Read + Seek> {
    source: R,
    total_size: u64,
    mime: String,
    window: Vec<u8>,
    window_offset: u64,
    window_len: usize,
    at_end: bool,
}

impl<R: Read + Seek> BufferedProvider<R> {
    /// Wrap `source` with a window of `capacity` bytes.
    ///
    /// The source length is taken by seeking to its end; the cursor
    /// is rewound afterwards. `capacity` must lie within the accepted
    /// chunk bounds, and the window allocation failing is reported as
    /// [`StreamError::Allocation`] rather than aborting.
    pub fn new(mut source: R, capacity: usize, mime: &str) -> Result<Self> {
        if capacity < MIN_CHUNK_SIZE {
            return Err(StreamError::BufferTooSmall(capacity));
        }
        if capacity > MAX_CHUNK_SIZE {
            return Err(StreamError::BufferTooLarge(capacity));
        }

        let total_size = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let mut window = Vec::new();
        window
            .try_reserve_exact(capacity)
            .map_err(|_| StreamError::Allocation)?;
        window.resize(capacity, 0);

        Ok(Self {
            source,
            total_size,
            mime: mime.to_string(),
            window,
            window_offset: 0,
            window_len: 0,
            at_end: false,
        })
    }

    /// Byte range currently held by the window.
    pub fn window_bounds(&self) -> (u64, u64) {
        (self.window_offset, self.window_offset + self.window_len as u64)
    }

    /// Whether the window reaches the end of the source.
    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// Ensure the window covers `offset`, refilling from the source
    /// when it does not. Only called for offsets below `total_size`.
    fn fill_window(&mut self, offset: u64) -> Result<()> {
        if offset >= self.window_offset
            && offset < self.window_offset + self.window_len as u64
        {
            return Ok(());
        }

        self.source.seek(SeekFrom::Start(offset))?;
        // one read per refill: a short fill is fine, it just shrinks
        // the window
        let filled = self.source.read(&mut self.window)?;
        self.window_offset = offset;
        self.window_len = filled;
        self.at_end = filled < self.window.len()
            || offset + filled as u64 >= self.total_size;

        if filled == 0 {
            return Err(StreamError::Provider(
                "buffered".to_owned(),
                format!("source truncated at offset {}", offset),
            ));
        }

        log::trace!(
            "buffered: window refilled to [{}, {})",
            self.window_offset,
            self.window_offset + self.window_len as u64
        );
        Ok(())
    }
}

impl BufferedProvider<File> {
    /// Open a file and buffer it with `capacity`-byte windows, MIME
    /// inferred from the extension.
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        capacity: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StreamError::NotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::new(file, capacity, mime_for_path(path))
    }
}

impl<R: Read + Seek> ContentProvider for BufferedProvider<R> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= self.total_size {
            return Ok(0);
        }

        self.fill_window(offset)?;

        let start = (offset - self.window_offset) as usize;
        let available = self.window_len - start;
        let count = buf.len().min(available);
        buf[..count].copy_from_slice(&self.window[start..start + count]);
        Ok(count)
    }

    fn total_size(&self) -> u64 {
        self.total_size
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn rewind(&mut self) -> Result<()> {
        self.source.seek(SeekFrom::Start(0))?;
        self.window_offset = 0;
        self.window_len = 0;
        self.at_end = false;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}
