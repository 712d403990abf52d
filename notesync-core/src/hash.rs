//! Content fingerprints for change detection

use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest (64 bits).
pub const FINGERPRINT_LEN: usize = 16;

/// Truncated SHA-256 of the UTF-8 content, hex encoded.
///
/// Only used to tell whether content changed, never as a security primitive.
pub fn fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}
