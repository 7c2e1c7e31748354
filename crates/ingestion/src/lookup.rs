//! The duplicate-lookup seam and a catalog-backed implementation.

use async_trait::async_trait;
use classifier::{classify, CatalogRecord, ClassifierConfig, MatchResult};
use fingerprint::{FileFingerprint, PerceptualHash};
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// What the coordinator sends to the duplicate lookup for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateProbe {
    pub filename: String,
    pub content_hash: String,
    pub byte_size: u64,
    pub perceptual_hash: PerceptualHash,
}

impl DuplicateProbe {
    pub fn new(filename: impl Into<String>, fp: &FileFingerprint) -> Self {
        Self {
            filename: filename.into(),
            content_hash: fp.content_hash.clone(),
            byte_size: fp.byte_size,
            perceptual_hash: fp.perceptual_hash,
        }
    }

    fn fingerprint(&self) -> FileFingerprint {
        FileFingerprint {
            content_hash: self.content_hash.clone(),
            perceptual_hash: self.perceptual_hash,
            byte_size: self.byte_size,
        }
    }
}

/// Outcome of a duplicate-lookup call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub is_duplicate: bool,
    pub result: MatchResult,
    /// Optional human-readable summary for the decision dialog.
    #[serde(default)]
    pub message: Option<String>,
}

impl LookupResponse {
    /// The "treat as unique" response, also used when the lookup is down.
    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            result: MatchResult::none(),
            message: None,
        }
    }
}

/// External duplicate-detection service.
///
/// How far back and which records are compared is the lookup's own concern;
/// the coordinator only sees the verdict.
#[async_trait]
pub trait DuplicateLookup: Send + Sync {
    async fn check(&self, probe: &DuplicateProbe) -> Result<LookupResponse, LookupError>;
}

/// Source of candidate catalog records for comparison.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Candidate records for one probe; scope and recency are the
    /// provider's concern.
    async fn candidates(&self, probe: &DuplicateProbe) -> Result<Vec<CatalogRecord>, LookupError>;
}

/// A [`DuplicateLookup`] that fetches candidates from a [`CatalogProvider`]
/// and runs the pure classifier over them.
pub struct CatalogDuplicateChecker<P> {
    provider: P,
    config: ClassifierConfig,
}

impl<P> CatalogDuplicateChecker<P> {
    pub fn new(provider: P, config: ClassifierConfig) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl<P: CatalogProvider> DuplicateLookup for CatalogDuplicateChecker<P> {
    async fn check(&self, probe: &DuplicateProbe) -> Result<LookupResponse, LookupError> {
        let candidates = self.provider.candidates(probe).await?;
        let result = classify(
            &probe.fingerprint(),
            &probe.filename,
            &candidates,
            &self.config,
        );
        let message = result.matched.as_ref().map(|record| {
            format!(
                "{:?} match ({}%) against existing image {}",
                result.kind, result.confidence, record.filename
            )
        });
        Ok(LookupResponse {
            is_duplicate: result.is_duplicate(),
            result,
            message,
        })
    }
}
