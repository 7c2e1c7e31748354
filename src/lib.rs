//! Umbrella crate for the reference-image deduplication and tag-accounting
//! engine.
//!
//! This crate stitches together fingerprinting, similarity classification,
//! batch ingestion, and tag-usage accounting so callers can operate over
//! uploaded reference images with a single API entry point. The member
//! crates stay independently usable:
//!
//! - [`fingerprint`] — content hash (SHA-256) + perceptual hash (64-bit
//!   average hash) per file
//! - [`classifier`] — pure tiered classification against catalog candidates
//! - [`ingestion`] — the sequential batch pipeline with its duplicate
//!   pause/resume state machine
//! - [`vocab`] — the runtime-configurable tag category schema
//! - [`ledger`] — per-tag usage counters driven by tag-state diffs

use thiserror::Error;

pub use classifier::{
    classify, normalize_filename, CatalogRecord, ClassifierConfig, ClassifierConfigError,
    MatchKind, MatchResult, RecordStatus,
};
pub use fingerprint::{
    content_hash, fingerprint, perceptual_hash, FileFingerprint, HashError, PerceptualHash,
    HASH_BITS,
};
pub use ingestion::{
    ActiveDecision, BatchConfig, BatchConfigError, BatchPhase, BatchSession,
    CatalogDuplicateChecker, CatalogProvider, DuplicateDecision, DuplicateLookup, DuplicateProbe,
    FileError, FileFailure, IncomingFile, IngestionCoordinator, IngestionError, LookupError,
    LookupResponse, MemoryObjectStore, ObjectStore, StoreError, UploadedFile,
};
pub use ledger::{
    diff_tags, CounterEntry, CounterError, CounterStore, LedgerReport, MemoryCounterStore,
    TagDiff, TagUsageLedger,
};
pub use vocab::{
    read_path, read_state, write_path, write_state, CategoryDefinition, SchemaError, StorageKind,
    TagState, TagValue, VocabularySchema,
};

/// Errors from the end-to-end convenience helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("fingerprinting failed: {0}")]
    Hashing(#[from] HashError),
}

/// The fingerprint and classification of one upload, bundled.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadAssessment {
    pub fingerprint: FileFingerprint,
    pub result: MatchResult,
}

impl UploadAssessment {
    /// Build the catalog record to persist for this upload.
    pub fn into_record(self, filename: &str) -> CatalogRecord {
        CatalogRecord::from_fingerprint(filename, &self.fingerprint)
    }
}

/// Fingerprint an upload and classify it against candidate catalog records
/// in one call.
///
/// Candidate retrieval is the caller's concern; pass whatever slice of the
/// catalog the lookup policy considers relevant.
pub fn classify_upload(
    bytes: &[u8],
    filename: &str,
    candidates: &[CatalogRecord],
    cfg: &ClassifierConfig,
) -> Result<UploadAssessment, PipelineError> {
    let fp = fingerprint(bytes)?;
    let result = classify(&fp, filename, candidates, cfg);
    Ok(UploadAssessment {
        fingerprint: fp,
        result,
    })
}

/// Diff two image documents' tag selections and apply the result to the
/// usage ledger.
///
/// Tag states are read from each document via the schema's storage paths;
/// counter failures are logged and swallowed inside the ledger, so the
/// returned report is informational only.
pub async fn apply_tag_change<S: CounterStore>(
    ledger: &TagUsageLedger<S>,
    old_doc: &serde_json::Value,
    new_doc: &serde_json::Value,
    schema: &VocabularySchema,
) -> LedgerReport {
    let old = read_state(old_doc, schema);
    let new = read_state(new_doc, schema);
    ledger.record_save(&old, &new, schema).await
}
