//! Content hashing.

use sha2::{Digest, Sha256};

/// SHA-256 digest of `bytes` as lowercase hex.
///
/// Used for proposal description hashes and for proposal identity keys.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
