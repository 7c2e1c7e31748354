//! Fingerprinting for uploaded reference images.
//!
//! Every file that enters the ingestion pipeline gets two fingerprints:
//!
//! - a **content hash** (SHA-256 over the raw bytes) that detects exact
//!   duplicates, and
//! - a **perceptual hash** (64-bit average hash over an 8×8 luminance grid)
//!   that detects resized or recompressed copies.
//!
//! Both are computed in [`fingerprint`] and bundled into a
//! [`FileFingerprint`], which is immutable once computed and identifies a
//! specific byte payload for the rest of its life in the catalog.

use serde::{Deserialize, Serialize};

mod error;
mod hash;
mod perceptual;

pub use crate::error::HashError;
pub use crate::hash::content_hash;
pub use crate::perceptual::{hash_image, perceptual_hash, PerceptualHash, HASH_BITS};

/// The dual fingerprint of one uploaded file.
///
/// Computed once at ingestion time and never mutated afterward. Two
/// fingerprints with equal `content_hash` refer to byte-identical payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// SHA-256 hex digest of the raw bytes.
    pub content_hash: String,
    /// 64-bit average hash, serialized as 16 hex characters.
    pub perceptual_hash: PerceptualHash,
    /// Payload length in bytes.
    pub byte_size: u64,
}

/// Fingerprint an encoded image payload.
///
/// Fails with [`HashError`] when the payload is empty or cannot be decoded;
/// callers must not treat an unhashed file as safe to upload.
pub fn fingerprint(bytes: &[u8]) -> Result<FileFingerprint, HashError> {
    let perceptual = perceptual_hash(bytes)?;
    Ok(FileFingerprint {
        content_hash: content_hash(bytes),
        perceptual_hash: perceptual,
        byte_size: bytes.len() as u64,
    })
}
