use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::errors::{Result, StreamError};
use crate::mime::mime_for_path;
use crate::provider::ContentProvider;

/// Plain file provider reading straight from the handle.
///
/// Seeks only when the cursor diverges from the requested offset, so
/// a sequential drain costs one read per chunk. There is no window;
/// for storage where every read is expensive use
/// [`BufferedProvider`](crate::provider::BufferedProvider).
pub struct FileProvider {
    path: PathBuf,
    file: File,
    total_size: u64,
    mime: String,
    position: u64,
}

impl FileProvider {
    /// Open `path` and capture its length and MIME type.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StreamError::NotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let total_size = file.metadata()?.len();
        log::debug!(
            "file/{}: opened, {} bytes",
            path.display(),
            total_size
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            total_size,
            mime: mime_for_path(path).to_string(),
            position: 0,
        })
    }
}

impl ContentProvider for FileProvider {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= self.total_size {
            return Ok(0);
        }

        if self.position != offset {
            self.file.seek(SeekFrom::Start(offset))?;
            self.position = offset;
        }

        let count = self.file.read(buf)?;
        if count == 0 {
            // the file shrank under us: offset is below the declared
            // size but the handle has nothing left
            return Err(StreamError::Provider(
                self.path.display().to_string(),
                format!("source truncated at offset {}", offset),
            ));
        }
        self.position += count as u64;
        Ok(count)
    }

    fn total_size(&self) -> u64 {
        self.total_size
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn rewind(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.position = 0;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}
