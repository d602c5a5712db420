//! Content-addressed identity for map packages.
//!
//! The content hash is the SHA-256 digest of the exact package bytes.
//! Any byte difference, including metadata-only repackaging, yields a
//! different identity. All derived assets are keyed by it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;

/// Read buffer size for streamed hashing.
const HASH_BLOCK_SIZE: usize = 4096;

/// Lowercase-hex SHA-256 digest of a map package's bytes.
///
/// Globally unique key for a [`crate::MapRecord`] and for every derived
/// asset path. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Hex digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the content identity of a package held in memory.
pub fn identify(bytes: &[u8]) -> ContentHash {
    let digest = Sha256::digest(bytes);
    ContentHash(hex_lower(&digest))
}

/// Compute the content identity of a package from a reader, returning the
/// hash and the total byte size.
///
/// Streams in fixed-size blocks so arbitrarily large packages never need
/// to be resident in memory.
pub fn identify_reader(mut reader: impl Read) -> std::io::Result<(ContentHash, u64)> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_BLOCK_SIZE];
    let mut size: u64 = 0;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    Ok((ContentHash(hex_lower(&hasher.finalize())), size))
}

fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_matches_known_sha256_vector() {
        let hash = identify(b"hello world");
        assert_eq!(
            hash.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn identify_is_stable_across_calls() {
        let bytes = b"map package payload";
        assert_eq!(identify(bytes), identify(bytes));
    }

    #[test]
    fn any_byte_difference_changes_identity() {
        assert_ne!(identify(b"map-a"), identify(b"map-b"));
    }

    #[test]
    fn reader_agrees_with_in_memory_digest_and_reports_size() {
        let bytes: Vec<u8> = (0u8..=255).cycle().take(3 * HASH_BLOCK_SIZE + 17).collect();
        let (hash, size) = identify_reader(bytes.as_slice()).unwrap();
        assert_eq!(hash, identify(&bytes));
        assert_eq!(size, bytes.len() as u64);
    }
}
