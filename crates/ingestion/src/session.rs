//! The batch session: an inspectable state-machine value.
//!
//! A [`BatchSession`] holds everything one batch accumulates — the pending
//! queue, at most one active duplicate decision, the uploaded files, and the
//! per-file failure reports. It exists only for the lifetime of one batch;
//! abandoning it is safe because every upload it already performed is
//! independent and idempotent.

use std::collections::VecDeque;

use bytes::Bytes;
use classifier::{CatalogRecord, MatchResult};
use fingerprint::FileFingerprint;
use serde::Serialize;
use tracing::info;

use crate::error::FileError;

/// One file submitted for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub filename: String,
    /// Declared MIME type; checked against the configured allow-list.
    pub content_type: String,
    pub bytes: Bytes,
}

impl IncomingFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Observable phase of a batch between coordinator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Validating,
    Fingerprinting,
    Classifying,
    ReadyToUpload,
    PausedOnDuplicate,
    Uploading,
    Complete,
}

/// The single file currently paused for a human decision, with the match
/// evidence that triggered the pause.
#[derive(Debug, Clone)]
pub struct ActiveDecision {
    pub file: IncomingFile,
    pub fingerprint: FileFingerprint,
    pub result: MatchResult,
}

impl ActiveDecision {
    /// The catalog record the paused file matched.
    pub fn matched_record(&self) -> Option<&CatalogRecord> {
        self.result.matched.as_ref()
    }
}

/// A file the coordinator flushed to the upload sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub url: String,
    pub fingerprint: FileFingerprint,
}

/// A per-file failure report; the batch carried on past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub filename: String,
    pub error: FileError,
}

/// State of one batch upload.
///
/// Invariants: the pending queue preserves submission order; at most one
/// [`ActiveDecision`] exists at a time — files behind it are not examined
/// until the queue resumes.
#[derive(Debug, Default)]
pub struct BatchSession {
    pub(crate) phase: BatchPhase,
    pub(crate) pending: VecDeque<IncomingFile>,
    pub(crate) active: Option<ActiveDecision>,
    pub(crate) uploaded: Vec<UploadedFile>,
    pub(crate) failures: Vec<FileFailure>,
    pub(crate) skipped: Vec<String>,
}

impl Default for BatchPhase {
    fn default() -> Self {
        BatchPhase::Idle
    }
}

impl BatchSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current phase; [`BatchPhase::PausedOnDuplicate`] or
    /// [`BatchPhase::Complete`] between coordinator calls.
    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    /// Files not yet examined, in submission order.
    pub fn pending(&self) -> impl Iterator<Item = &IncomingFile> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// The decision currently blocking the queue, if any.
    pub fn active_decision(&self) -> Option<&ActiveDecision> {
        self.active.as_ref()
    }

    /// Inspect the matched catalog record without committing a decision.
    ///
    /// A non-committing side action: it neither clears the active decision
    /// nor resumes the queue.
    pub fn view_existing(&self) -> Option<&CatalogRecord> {
        let record = self.active.as_ref().and_then(ActiveDecision::matched_record);
        if let Some(record) = record {
            info!(record_id = %record.id, filename = %record.filename, "existing_record_viewed");
        }
        record
    }

    /// Files flushed to the upload sink so far, in processing order.
    pub fn uploaded(&self) -> &[UploadedFile] {
        &self.uploaded
    }

    /// Per-file failures reported so far.
    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    /// Filenames discarded via `skip_duplicate`.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// True once the queue is drained and no decision remains.
    pub fn is_complete(&self) -> bool {
        self.phase == BatchPhase::Complete
    }
}
