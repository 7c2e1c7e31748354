//! Data model and configuration for the similarity classifier.

use chrono::{DateTime, Utc};
use fingerprint::{FileFingerprint, PerceptualHash, HASH_BITS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle status of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Visible in the catalog and eligible as a duplicate candidate.
    #[default]
    Active,
    /// Retained for history but hidden from the working set.
    Archived,
}

/// A previously stored image in the reference catalog.
///
/// Created once per successfully ingested image. The fingerprint fields
/// (`content_hash`, `perceptual_hash`, `byte_size`) are never mutated after
/// creation; they identify the exact payload that was uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: Uuid,
    pub filename: String,
    pub content_hash: String,
    pub perceptual_hash: PerceptualHash,
    pub byte_size: u64,
    #[serde(default)]
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

impl CatalogRecord {
    /// Build a fresh catalog record for a newly uploaded file.
    pub fn from_fingerprint(filename: impl Into<String>, fp: &FileFingerprint) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            content_hash: fp.content_hash.clone(),
            perceptual_hash: fp.perceptual_hash,
            byte_size: fp.byte_size,
            status: RecordStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// Classification tier for a new upload.
///
/// Ordered by evidence strength: content-hash equality is proof of a byte
/// identical payload, perceptual proximity is strong evidence, a shared
/// filename alone is weak evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Byte-identical to an existing record.
    Exact,
    /// Perceptually close to an existing record (resized/recompressed copy).
    Similar,
    /// Same normalized filename as an existing record, different bytes.
    Filename,
    /// No candidate matched by any rule.
    #[default]
    None,
}

/// The outcome of classifying one upload against the candidate catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub kind: MatchKind,
    /// 0–100; 100 for exact matches, scaled by bit agreement for similar
    /// matches, a configured split for filename matches.
    pub confidence: u8,
    /// The record that triggered the match, absent for [`MatchKind::None`].
    pub matched: Option<CatalogRecord>,
}

impl MatchResult {
    /// The "no candidate matched" result.
    pub fn none() -> Self {
        Self {
            kind: MatchKind::None,
            confidence: 0,
            matched: None,
        }
    }

    /// True for any tier other than [`MatchKind::None`].
    pub fn is_duplicate(&self) -> bool {
        self.kind != MatchKind::None
    }
}

/// Tunable thresholds for the classifier.
///
/// The defaults are empirically tuned cutoffs, not load-bearing semantics;
/// deployments may override any of them via configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum Hamming distance (out of 64 bits) still considered a
    /// perceptual match.
    pub similar_max_distance: u32,
    /// Confidence assigned to a filename match whose byte sizes also agree.
    pub filename_size_match_confidence: u8,
    /// Confidence assigned to a filename match with differing byte sizes.
    pub filename_only_confidence: u8,
}

impl ClassifierConfig {
    /// Validates internal consistency; intended for startup-time checks.
    pub fn validate(&self) -> Result<(), ClassifierConfigError> {
        if self.similar_max_distance > HASH_BITS {
            return Err(ClassifierConfigError::DistanceOutOfRange {
                distance: self.similar_max_distance,
            });
        }
        for (name, value) in [
            (
                "filename_size_match_confidence",
                self.filename_size_match_confidence,
            ),
            ("filename_only_confidence", self.filename_only_confidence),
        ] {
            if value > 100 {
                return Err(ClassifierConfigError::ConfidenceOutOfRange {
                    field: name,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            similar_max_distance: 10,
            filename_size_match_confidence: 80,
            filename_only_confidence: 50,
        }
    }
}

/// Startup-time configuration errors for [`ClassifierConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClassifierConfigError {
    #[error("similar_max_distance ({distance}) exceeds the {HASH_BITS}-bit hash width")]
    DistanceOutOfRange { distance: u32 },
    #[error("{field} ({value}) exceeds the 0-100 confidence scale")]
    ConfidenceOutOfRange { field: &'static str, value: u8 },
}
