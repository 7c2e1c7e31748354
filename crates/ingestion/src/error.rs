//! Error surface of the ingestion pipeline.
//!
//! Propagation policy: per-file failures (validation,
//! hashing, persistence) are recorded on the session and never abort the
//! surrounding batch; a lookup outage degrades to "treat as unique"; the
//! only intentional halt is the duplicate-decision pause, which is a state,
//! not an error.

use thiserror::Error;

use crate::config::BatchConfigError;

/// Why a single file was dropped from a batch. Surfaced to the user as an
/// actionable per-file message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FileError {
    /// Rejected before hashing: wrong type or too large.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The file could not be decoded and hashed; dropped rather than
    /// uploaded unverified.
    #[error("hashing failed: {0}")]
    Hashing(String),
    /// The upload itself failed; the file is left un-uploaded with no
    /// automatic retry.
    #[error("upload failed: {0}")]
    Persistence(String),
}

/// Batch-level errors: misuse of the pause/resume protocol or a bad config.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestionError {
    /// `skip_duplicate`/`keep_duplicate` called while nothing is paused.
    #[error("no duplicate decision is pending")]
    NoActiveDecision,
    #[error("invalid batch config: {0}")]
    InvalidConfig(#[from] BatchConfigError),
}

/// The external duplicate-lookup call failed.
///
/// Never fatal to a batch: the coordinator logs the outage and proceeds as
/// if the file were unique, trading strict dedup for availability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LookupError {
    #[error("duplicate lookup unavailable: {0}")]
    Unavailable(String),
}

/// The external object store rejected or failed an upload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("object store unavailable: {0}")]
    Unavailable(String),
    #[error("object store rejected {path}: {reason}")]
    Rejected { path: String, reason: String },
}
