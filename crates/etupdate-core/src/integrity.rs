//! Archive integrity verification.
//!
//! The archive is hashed in fixed-size chunks so memory use does not depend
//! on its size, then compared against the digest published next to it.

use std::io::ErrorKind;
use std::io::Read;

use md5::Md5;
use sha2::Digest;
use sha2::Sha256;

use crate::Result;
use crate::UpdateError;

/// Chunk size used when hashing streams (64 KiB).
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithm used by the published checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// MD5, published upstream as `emerging.rules.tar.gz.md5`.
    #[default]
    Md5,

    /// SHA-256, for mirrors that publish a stronger checksum.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the checksum file extension for this algorithm.
    ///
    /// # Examples
    ///
    /// ```
    /// use etupdate_core::HashAlgorithm;
    ///
    /// assert_eq!(HashAlgorithm::Md5.extension(), "md5");
    /// assert_eq!(HashAlgorithm::Sha256.extension(), "sha256");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    /// Returns the length of a hex-encoded digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }
}

/// Incremental hash accumulator.
///
/// Feeding the same bytes in any chunking yields the same digest.
///
/// # Examples
///
/// ```
/// use etupdate_core::HashAlgorithm;
/// use etupdate_core::integrity::StreamHasher;
///
/// let mut hasher = StreamHasher::new(HashAlgorithm::Md5);
/// hasher.update(b"hello ");
/// hasher.update(b"world");
/// assert_eq!(hasher.finalize_hex(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
/// ```
#[derive(Debug, Clone)]
pub enum StreamHasher {
    /// MD5 state.
    Md5(Md5),
    /// SHA-256 state.
    Sha256(Sha256),
}

impl StreamHasher {
    /// Creates an empty accumulator for `algorithm`.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(Md5::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    /// Feeds a chunk into the accumulator.
    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(hasher) => hasher.update(chunk),
            Self::Sha256(hasher) => hasher.update(chunk),
        }
    }

    /// Consumes the accumulator and returns the lowercase hex digest.
    #[must_use]
    pub fn finalize_hex(self) -> String {
        match self {
            Self::Md5(hasher) => format!("{:x}", hasher.finalize()),
            Self::Sha256(hasher) => format!("{:x}", hasher.finalize()),
        }
    }
}

/// Hashes everything `reader` yields, 64 KiB at a time.
///
/// Interrupted reads are retried; any other read error is returned.
///
/// # Examples
///
/// ```
/// use etupdate_core::HashAlgorithm;
/// use etupdate_core::integrity::hash_stream;
/// use std::io::Cursor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_stream(&mut Cursor::new(b"hello world"), HashAlgorithm::Sha256)?;
/// assert_eq!(
///     digest,
///     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
/// );
/// # Ok(())
/// # }
/// ```
pub fn hash_stream<R: Read + ?Sized>(reader: &mut R, algorithm: HashAlgorithm) -> Result<String> {
    let mut hasher = StreamHasher::new(algorithm);
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(UpdateError::Io(e)),
        }
    }

    Ok(hasher.finalize_hex())
}

/// Hashes an in-memory buffer in one call.
#[must_use]
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    let mut hasher = StreamHasher::new(algorithm);
    hasher.update(data);
    hasher.finalize_hex()
}

/// Compares a computed digest against the published one.
///
/// Surrounding whitespace is stripped from `expected`; the remaining bytes
/// must match exactly.
///
/// # Errors
///
/// Returns `UpdateError::Integrity` on mismatch.
pub fn verify_digest(actual: &str, expected: &str) -> Result<()> {
    let expected = expected.trim();
    if actual.as_bytes() == expected.as_bytes() {
        Ok(())
    } else {
        Err(UpdateError::Integrity {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
