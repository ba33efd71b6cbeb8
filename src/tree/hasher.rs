//! Streaming SHA-1 content digests for manifest entries

use crate::error::ScanError;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default read size for streaming digests
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Digest and byte length of one file's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigest {
    /// Lowercase hex SHA-1
    pub hex: String,
    pub size: u64,
}

/// Computes content digests by streaming files in fixed-size chunks.
///
/// Stateless apart from the chunk size, so one digester can be shared across
/// worker threads.
#[derive(Debug, Clone, Copy)]
pub struct ContentDigester {
    chunk_size: usize,
}

impl Default for ContentDigester {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ContentDigester {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Digest the file at `path`.
    ///
    /// The file handle is dropped on every exit path. A read failure discards
    /// the partial hash.
    pub fn digest(&self, path: &Path) -> Result<ContentDigest, ScanError> {
        let file = File::open(path).map_err(|source| ScanError::Digest {
            path: path.to_path_buf(),
            source,
        })?;
        self.digest_reader(file).map_err(|source| ScanError::Digest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Digest everything readable from `reader`
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> std::io::Result<ContentDigest> {
        let mut hasher = Sha1::new();
        let mut buf = vec![0u8; self.chunk_size];
        let mut size = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
            size += n as u64;
        }
        Ok(ContentDigest {
            hex: hex::encode(hasher.finalize()),
            size,
        })
    }
}

/// Reader adapter that digests whatever passes through it.
///
/// Lets a consumer such as the archive writer check the bytes it actually
/// copied against the digest recorded at scan time.
pub struct DigestingReader<R> {
    inner: R,
    hasher: Sha1,
    size: u64,
}

impl<R: Read> DigestingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha1::new(),
            size: 0,
        }
    }

    /// Digest of the bytes read so far
    pub fn finish(self) -> ContentDigest {
        ContentDigest {
            hex: hex::encode(self.hasher.finalize()),
            size: self.size,
        }
    }
}

impl<R: Read> Read for DigestingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.size += n as u64;
        Ok(n)
    }
}

/// SHA-1 of an in-memory buffer, hex encoded
pub fn compute_content_hash(content: &[u8]) -> String {
    hex::encode(Sha1::digest(content))
}
