//! Error types produced by the fingerprint crate.

use thiserror::Error;

/// Errors that can occur while fingerprinting an uploaded file.
///
/// A decode failure is a hard error: a file we could not hash must never be
/// treated as "safe to upload", so callers handle the failure explicitly
/// instead of falling through to a unique classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HashError {
    /// The payload contained zero bytes.
    #[error("payload is empty")]
    EmptyPayload,

    /// The payload could not be decoded as an image.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// A perceptual hash string was not 16 hexadecimal characters.
    #[error("invalid perceptual hash literal: {0}")]
    InvalidHashLiteral(String),
}
