//! Perceptual (average-luminance) image hashing.
//!
//! The perceptual hash is a coarse 64-bit fingerprint derived from a
//! downsampled grayscale rendering of the image. It survives resizing and
//! recompression, which the content hash does not, but it is sensitive to
//! cropping and heavy edits.
//!
//! # Algorithm
//!
//! ```text
//! decode → resize to 8×8 → grayscale → mean luminance
//!        → 1 bit per sample (luma >= mean) → pack MSB-first into u64
//! ```
//!
//! # Known degeneracy
//!
//! A perfectly uniform-color image thresholds every sample at the mean and
//! produces an all-ones hash, so uniform images of different colors are
//! indistinguishable from one another under this hash. This is an accepted
//! property of average hashing, not a bug to paper over; exact-duplicate
//! detection still separates them via the content hash.

use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use image::DynamicImage;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::HashError;

/// Number of bits in a perceptual hash.
pub const HASH_BITS: u32 = 64;

/// Downsample grid edge length; `GRID * GRID == HASH_BITS`.
const GRID: u32 = 8;

/// A fixed-width 64-bit perceptual hash, rendered as 16 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    /// Wrap a raw 64-bit hash value.
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw 64-bit hash value.
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Render as a fixed-width (16 character) lowercase hex string.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parse a fixed-width hex string produced by [`to_hex`](Self::to_hex).
    pub fn parse(s: &str) -> Result<Self, HashError> {
        if s.len() != 16 {
            return Err(HashError::InvalidHashLiteral(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| HashError::InvalidHashLiteral(s.to_string()))
    }

    /// Count of differing bits between two hashes.
    ///
    /// Symmetric, and zero exactly when the hashes are identical.
    pub fn hamming_distance(self, other: PerceptualHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for PerceptualHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Serialized as the hex string so catalog records and lookup probes carry a
// stable wire representation.
impl Serialize for PerceptualHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PerceptualHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = PerceptualHash;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 16-character hex string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                PerceptualHash::parse(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

/// Compute the perceptual hash of an encoded image payload.
///
/// Decode failure is a hard [`HashError`], never a silent skip: an unhashed
/// file must not be mistaken for one that is safe to upload.
pub fn perceptual_hash(bytes: &[u8]) -> Result<PerceptualHash, HashError> {
    if bytes.is_empty() {
        return Err(HashError::EmptyPayload);
    }
    let img = image::load_from_memory(bytes).map_err(|err| HashError::Decode(err.to_string()))?;
    Ok(hash_image(&img))
}

/// Compute the perceptual hash of an already-decoded image.
pub fn hash_image(img: &DynamicImage) -> PerceptualHash {
    let small = img.resize_exact(GRID, GRID, FilterType::Triangle).to_luma8();

    let total: u32 = small.pixels().map(|p| u32::from(p.0[0])).sum();
    let mean = total / (GRID * GRID);

    let mut bits = 0u64;
    for pixel in small.pixels() {
        bits <<= 1;
        if u32::from(pixel.0[0]) >= mean {
            bits |= 1;
        }
    }
    PerceptualHash(bits)
}
