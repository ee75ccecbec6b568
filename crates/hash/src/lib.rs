#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Streaming file digests for filever
//!
//! Files are read through a fixed 1 MiB buffer, so memory use does not
//! depend on file or window size. Progress callbacks fire once per buffer's
//! worth of consumed bytes rather than once per read call.

mod algorithm;

pub use algorithm::HashAlgorithm;

use filever_errors::{Error, StorageError};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Size of the read buffer and of the progress reporting granularity
pub const BUFFER_SIZE: usize = 1 << 20; // 1 MiB

/// Progress callback receiving the number of newly consumed bytes
pub type ProgressFn<'f> = dyn Fn(u64) + Send + Sync + 'f;

/// Half-open byte window `[start, start + len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub len: u64,
}

impl ByteRange {
    #[must_use]
    pub fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }
}

/// Accumulates consumed bytes and reports them in buffer-sized batches
struct ProgressBatcher<'a> {
    callback: Option<&'a ProgressFn<'a>>,
    pending: u64,
}

impl<'a> ProgressBatcher<'a> {
    fn new(callback: Option<&'a ProgressFn<'a>>) -> Self {
        Self {
            callback,
            pending: 0,
        }
    }

    fn add(&mut self, n: u64) {
        self.pending += n;
        if self.pending >= BUFFER_SIZE as u64 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.pending > 0 {
            if let Some(callback) = self.callback {
                callback(self.pending);
            }
            self.pending = 0;
        }
    }
}

/// Digest a whole file
///
/// # Errors
/// Returns a storage error if the file cannot be opened or read.
pub async fn hash_file(
    path: &Path,
    algorithm: HashAlgorithm,
    on_progress: Option<&ProgressFn<'_>>,
) -> Result<String, Error> {
    digest_file(path, algorithm, None, on_progress).await
}

/// Digest exactly `range.len` bytes starting at `range.start`
///
/// # Errors
/// Returns `StorageError::UnexpectedEof` if the file ends before the window
/// is fully consumed, or a storage error for any other I/O failure.
pub async fn hash_file_range(
    path: &Path,
    algorithm: HashAlgorithm,
    range: ByteRange,
    on_progress: Option<&ProgressFn<'_>>,
) -> Result<String, Error> {
    digest_file(path, algorithm, Some(range), on_progress).await
}

/// Digest a file, or a window of it, into an upper-case hex string
///
/// `None` for `range` means the whole file.
///
/// # Errors
/// Returns a storage error if the file cannot be opened, read or seeked,
/// and `StorageError::UnexpectedEof` when a window runs past end of file.
pub async fn digest_file(
    path: &Path,
    algorithm: HashAlgorithm,
    range: Option<ByteRange>,
    on_progress: Option<&ProgressFn<'_>>,
) -> Result<String, Error> {
    let io_err = |e: std::io::Error| StorageError::from_io_with_path(&e, path);

    let mut file = File::open(path).await.map_err(io_err)?;
    let mut digester = algorithm.digester();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut progress = ProgressBatcher::new(on_progress);

    match range {
        None => loop {
            let n = file.read(&mut buffer).await.map_err(io_err)?;
            if n == 0 {
                break;
            }
            digester.update(&buffer[..n]);
            progress.add(n as u64);
        },
        Some(range) => {
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(io_err)?;

            let mut read = 0u64;
            while read < range.len {
                let want = usize::try_from(range.len - read)
                    .map_or(BUFFER_SIZE, |remaining| remaining.min(BUFFER_SIZE));
                let n = file.read(&mut buffer[..want]).await.map_err(io_err)?;
                if n == 0 {
                    return Err(StorageError::UnexpectedEof {
                        path: path.display().to_string(),
                        offset: range.start + read,
                        wanted: range.len,
                    }
                    .into());
                }
                digester.update(&buffer[..n]);
                progress.add(n as u64);
                read += n as u64;
            }
        }
    }

    progress.flush();
    Ok(digester.finalize_hex())
}

/// Digest a file with an algorithm given by name
///
/// The name is validated before the file is opened.
///
/// # Errors
/// Returns `ConfigError::UnsupportedAlgorithm` for unknown names, otherwise
/// the same errors as [`digest_file`].
pub async fn digest_file_named(
    path: &Path,
    algorithm: &str,
    range: Option<ByteRange>,
    on_progress: Option<&ProgressFn<'_>>,
) -> Result<String, Error> {
    let algorithm = HashAlgorithm::parse(algorithm)?;
    digest_file(path, algorithm, range, on_progress).await
}

/// Digest an in-memory buffer
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> String {
    let mut digester = algorithm.digester();
    digester.update(data);
    digester.finalize_hex()
}

/// Compare a computed digest with a recorded one, ignoring case and
/// surrounding whitespace on the recorded side
#[must_use]
pub fn digests_match(computed: &str, recorded: &str) -> bool {
    computed.eq_ignore_ascii_case(recorded.trim())
}
