use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::errors::{Result, StreamError};
use crate::mime::mime_for_path;
use crate::provider::ContentProvider;

/// How many consecutive recovery attempts a [`RetryingProvider`] makes
/// before it refuses further reads.
pub const RETRY_LIMIT: u32 = 3;

/// Opens fresh handles to a random-access source.
///
/// The seam that lets [`RetryingProvider`] recover from transient
/// faults: when a handle goes bad, the factory supplies a new one
/// without the provider changing identity.
pub trait SourceFactory {
    type Source: Read + Seek;

    /// Open a new handle to the source.
    fn open(&self) -> Result<Self::Source>;

    /// Length of the source in bytes.
    fn len(&self) -> Result<u64>;
}

/// [`SourceFactory`] over a filesystem path.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SourceFactory for FileSource {
    type Source = File;

    fn open(&self) -> Result<File> {
        if !self.path.exists() {
            return Err(StreamError::NotFound(
                self.path.display().to_string(),
            ));
        }
        Ok(File::open(&self.path)?)
    }

    fn len(&self) -> Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }
}

/// Provider over an unreliable source, recovering from faults by
/// reopening the handle.
///
/// Each failed read costs one recovery attempt: reopen, then retry the
/// operation exactly once. A successful non-empty read clears the
/// attempt counter; once [`RETRY_LIMIT`] consecutive attempts have
/// failed the provider stops touching the source and every read fails
/// until an explicit [`rewind`](ContentProvider::rewind).
pub struct RetryingProvider<F: SourceFactory> {
    factory: F,
    handle: F::Source,
    total_size: u64,
    mime: String,
    retries: u32,
}

impl<F: SourceFactory> RetryingProvider<F> {
    /// Open the source through `factory` and capture its length.
    pub fn new(factory: F, mime: &str) -> Result<Self> {
        let handle = factory.open()?;
        let total_size = factory.len()?;
        Ok(Self {
            factory,
            handle,
            total_size,
            mime: mime.to_string(),
            retries: 0,
        })
    }

    fn read_attempt(
        &mut self,
        buf: &mut [u8],
        offset: u64,
    ) -> Result<usize> {
        self.handle.seek(SeekFrom::Start(offset))?;
        let count = self.handle.read(buf)?;
        if count == 0 {
            // only reached with offset below total_size
            return Err(StreamError::Provider(
                "retry".to_owned(),
                format!("source truncated at offset {}", offset),
            ));
        }
        Ok(count)
    }
}

impl RetryingProvider<FileSource> {
    /// Retrying provider over a file path, MIME inferred from the
    /// extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mime = mime_for_path(&path).to_string();
        Self::new(FileSource::new(path), &mime)
    }
}

impl<F: SourceFactory> ContentProvider for RetryingProvider<F> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset >= self.total_size {
            return Ok(0);
        }

        if self.retries >= RETRY_LIMIT {
            return Err(StreamError::Provider(
                "retry".to_owned(),
                format!(
                    "recovery budget exhausted after {} attempts",
                    RETRY_LIMIT
                ),
            ));
        }

        match self.read_attempt(buf, offset) {
            Ok(count) => {
                self.retries = 0;
                Ok(count)
            }
            Err(err) => {
                self.retries += 1;
                log::warn!(
                    "retry: read failed at offset {} (attempt {}/{}): {}",
                    offset,
                    self.retries,
                    RETRY_LIMIT,
                    err
                );
                self.handle = self.factory.open()?;
                let count = self.read_attempt(buf, offset)?;
                self.retries = 0;
                Ok(count)
            }
        }
    }

    fn total_size(&self) -> u64 {
        self.total_size
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn rewind(&mut self) -> Result<()> {
        self.retries = 0;
        self.handle.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::{self, Cursor};
    use std::rc::Rc;

    use super::*;

    /// Source whose reads fail while the shared fault budget lasts.
    struct FlakySource {
        cursor: Cursor<Vec<u8>>,
        faults: Rc<Cell<u32>>,
    }

    impl Read for FlakySource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let remaining = self.faults.get();
            if remaining > 0 {
                self.faults.set(remaining - 1);
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "injected fault",
                ));
            }
            self.cursor.read(buf)
        }
    }

    impl Seek for FlakySource {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.cursor.seek(pos)
        }
    }

    struct FlakyFactory {
        data: Vec<u8>,
        faults: Rc<Cell<u32>>,
    }

    impl SourceFactory for FlakyFactory {
        type Source = FlakySource;

        fn open(&self) -> Result<FlakySource> {
            Ok(FlakySource {
                cursor: Cursor::new(self.data.clone()),
                faults: self.faults.clone(),
            })
        }

        fn len(&self) -> Result<u64> {
            Ok(self.data.len() as u64)
        }
    }

    fn flaky_provider(
        faults: u32,
    ) -> (RetryingProvider<FlakyFactory>, Rc<Cell<u32>>) {
        let budget = Rc::new(Cell::new(faults));
        let factory = FlakyFactory {
            data: b"0123456789abcdef".to_vec(),
            faults: budget.clone(),
        };
        let provider = RetryingProvider::new(factory, "text/plain")
            .expect("Failed to construct provider");
        (provider, budget)
    }

    #[test]
    fn transient_fault_recovers_and_clears_counter() {
        let (mut provider, _budget) = flaky_provider(1);

        let mut buf = [0u8; 4];
        assert_eq!(provider.read_at(&mut buf, 0).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(provider.retries, 0);
    }

    #[test]
    fn budget_exhausts_after_consecutive_failures() {
        let (mut provider, budget) = flaky_provider(u32::MAX);

        let mut buf = [0u8; 4];
        for _ in 0..RETRY_LIMIT {
            assert!(provider.read_at(&mut buf, 0).is_err());
        }
        assert_eq!(provider.retries, RETRY_LIMIT);

        // further reads refuse without touching the source
        let before = budget.get();
        assert!(provider.read_at(&mut buf, 0).is_err());
        assert_eq!(budget.get(), before);

        // even a now-healthy source stays locked out until rewind
        budget.set(0);
        assert!(provider.read_at(&mut buf, 0).is_err());

        provider.rewind().unwrap();
        assert_eq!(provider.read_at(&mut buf, 0).unwrap(), 4);
        assert_eq!(&buf, b"0123");
    }

    #[test]
    fn success_between_failures_resets_the_counter() {
        let (mut provider, budget) = flaky_provider(0);
        let mut buf = [0u8; 4];

        // two separate transient faults, each followed by recovery:
        // neither exhausts the budget because successes reset it
        for _ in 0..2 {
            budget.set(1);
            assert_eq!(provider.read_at(&mut buf, 4).unwrap(), 4);
            assert_eq!(provider.retries, 0);
        }
        assert_eq!(&buf, b"4567");
    }

    #[test]
    fn read_past_end_returns_zero_without_recovery() {
        let (mut provider, budget) = flaky_provider(5);
        let mut buf = [0u8; 4];
        assert_eq!(provider.read_at(&mut buf, 16).unwrap(), 0);
        // end-of-content is not a fault
        assert_eq!(budget.get(), 5);
        assert_eq!(provider.retries, 0);
    }

    #[test]
    fn file_source_round_trip() {
        use tempdir::TempDir;

        let temp_dir = TempDir::new("retry")
            .expect("Failed to create temporary directory");
        let path = temp_dir.path().join("data.txt");
        std::fs::write(&path, b"persistent bytes").unwrap();

        let mut provider = RetryingProvider::from_path(&path).unwrap();
        assert_eq!(provider.total_size(), 16);
        assert_eq!(provider.mime_type(), "text/plain");

        let mut buf = [0u8; 16];
        assert_eq!(provider.read_at(&mut buf, 0).unwrap(), 16);
        assert_eq!(&buf, b"persistent bytes");
    }

    #[test]
    fn missing_file_fails_construction() {
        assert!(matches!(
            RetryingProvider::from_path("/definitely/not/here.bin"),
            Err(StreamError::NotFound(_))
        ));
    }
}
