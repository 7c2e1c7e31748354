//! Cryptographic content hashing.
//!
//! The content hash identifies a specific byte payload: equal digests imply
//! byte-identical files. It is computed over the raw payload only, so the
//! filename and any metadata never influence it.

use sha2::{Digest, Sha256};

/// Hash a raw byte payload with SHA-256 and return a lowercase hex digest.
///
/// Deterministic: hashing the same bytes twice always yields the same
/// 64-character string. Used exclusively for exact-duplicate detection;
/// near-duplicate detection goes through the perceptual hash instead.
///
/// # Examples
///
/// ```rust
/// use fingerprint::content_hash;
///
/// let digest = content_hash(b"payload");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, content_hash(b"payload"));
/// ```
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
