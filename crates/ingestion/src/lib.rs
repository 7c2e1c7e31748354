//! Batch ingestion with duplicate detection and human pause/resume.
//!
//! This is where reference images enter the system. A batch of uploaded
//! files is validated, fingerprinted, and checked against the catalog one
//! file at a time; unique files are flushed straight to the upload sink,
//! and the first detected duplicate halts the batch for a human decision.
//!
//! ## How a batch runs
//!
//! - **Validate first** - MIME allow-list and size limit are checked before
//!   any hashing, so invalid files are rejected without wasted work
//! - **Strictly sequential** - each file is fingerprinted and classified in
//!   submission order, because any file may pause the whole batch and the
//!   remainder of the queue must stay untouched behind it
//! - **Flush early** - a unique file is uploaded immediately, so files that
//!   cleared before a pause are never blocked behind the pending decision
//! - **Pause on a duplicate** - the matched file, its [`MatchResult`], and
//!   the unexamined remainder become the session's single
//!   [`ActiveDecision`]; resuming is an explicit call
//!   ([`skip_duplicate`](IngestionCoordinator::skip_duplicate) /
//!   [`keep_duplicate`](IngestionCoordinator::keep_duplicate)), never a
//!   hidden continuation
//!
//! Per-file failures never abort the batch: a hashing failure drops that
//! file with a report, an upload failure leaves it un-uploaded with a
//! report, and a lookup outage degrades to "treat as unique", trading
//! strict dedup for availability.
//!
//! The pause carries no timeout; it waits on human input. Abandoning a
//! paused session is safe because every completed upload is independent and
//! idempotent, and the rest of the queue is simply never processed.

use std::time::Instant;

use fingerprint::FileFingerprint;
use tracing::{info, warn};

mod config;
mod error;
mod lookup;
mod session;
mod store;

pub use crate::config::{BatchConfig, BatchConfigError};
pub use crate::error::{FileError, IngestionError, LookupError, StoreError};
pub use crate::lookup::{
    CatalogDuplicateChecker, CatalogProvider, DuplicateLookup, DuplicateProbe, LookupResponse,
};
pub use crate::session::{
    ActiveDecision, BatchPhase, BatchSession, FileFailure, IncomingFile, UploadedFile,
};
pub use crate::store::{MemoryObjectStore, ObjectStore, StoredObject};

// Re-exported so callers wiring up a coordinator don't need to depend on the
// classifier crate directly.
pub use classifier::{CatalogRecord, ClassifierConfig, MatchKind, MatchResult};

/// The human verdict on a paused duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateDecision {
    /// Discard the paused file and resume the queue.
    Skip,
    /// Upload the paused file anyway and resume the queue.
    Keep,
}

/// Drives a batch upload through validation, fingerprinting, duplicate
/// classification, and upload, pausing on detected duplicates.
#[derive(Debug)]
pub struct IngestionCoordinator<L, S> {
    config: BatchConfig,
    lookup: L,
    store: S,
}

impl<L: DuplicateLookup, S: ObjectStore> IngestionCoordinator<L, S> {
    /// Build a coordinator, validating the config up front.
    pub fn new(config: BatchConfig, lookup: L, store: S) -> Result<Self, IngestionError> {
        config.validate()?;
        Ok(Self {
            config,
            lookup,
            store,
        })
    }

    /// The object store uploads land in.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and process a batch of files.
    ///
    /// Returns the session in either [`BatchPhase::Complete`] or
    /// [`BatchPhase::PausedOnDuplicate`]; in the latter case exactly one
    /// [`ActiveDecision`] is exposed and the remainder of the queue is
    /// untouched until a resume call.
    pub async fn check_files(&self, files: Vec<IncomingFile>) -> BatchSession {
        let start = Instant::now();
        info!(batch_size = files.len(), "batch_started");

        let mut session = BatchSession::new();
        session.phase = BatchPhase::Validating;
        for file in files {
            match self.validate(&file) {
                Ok(()) => session.pending.push_back(file),
                Err(err) => {
                    warn!(filename = %file.filename, error = %err, "file_rejected");
                    session.failures.push(FileFailure {
                        filename: file.filename,
                        error: err,
                    });
                }
            }
        }

        self.drive(&mut session).await;
        let elapsed_micros = start.elapsed().as_micros();
        info!(phase = ?session.phase, elapsed_micros, "batch_checked");
        session
    }

    /// Resume a paused session with an explicit decision.
    pub async fn resume(
        &self,
        session: &mut BatchSession,
        decision: DuplicateDecision,
    ) -> Result<(), IngestionError> {
        let active = session
            .active
            .take()
            .ok_or(IngestionError::NoActiveDecision)?;
        match decision {
            DuplicateDecision::Skip => {
                info!(filename = %active.file.filename, "duplicate_skipped");
                session.skipped.push(active.file.filename);
            }
            DuplicateDecision::Keep => {
                info!(filename = %active.file.filename, "duplicate_kept");
                self.upload(session, active.file, active.fingerprint).await;
            }
        }
        self.drive(session).await;
        Ok(())
    }

    /// Discard the paused file and resume processing the queue.
    pub async fn skip_duplicate(&self, session: &mut BatchSession) -> Result<(), IngestionError> {
        self.resume(session, DuplicateDecision::Skip).await
    }

    /// Upload the paused file anyway and resume processing the queue.
    pub async fn keep_duplicate(&self, session: &mut BatchSession) -> Result<(), IngestionError> {
        self.resume(session, DuplicateDecision::Keep).await
    }

    /// Cheap pre-hash validation: declared MIME and size limit.
    fn validate(&self, file: &IncomingFile) -> Result<(), FileError> {
        if !self.config.accepts_mime(&file.content_type) {
            return Err(FileError::Validation(format!(
                "unsupported content type {:?}",
                file.content_type
            )));
        }
        if file.bytes.len() > self.config.max_file_bytes {
            return Err(FileError::Validation(format!(
                "file size {} exceeds limit of {}",
                file.bytes.len(),
                self.config.max_file_bytes
            )));
        }
        Ok(())
    }

    /// Process the pending queue until it drains or a duplicate pauses it.
    async fn drive(&self, session: &mut BatchSession) {
        while let Some(file) = session.pending.pop_front() {
            session.phase = BatchPhase::Fingerprinting;
            let fp = match fingerprint::fingerprint(&file.bytes) {
                Ok(fp) => fp,
                Err(err) => {
                    warn!(filename = %file.filename, error = %err, "file_hashing_failed");
                    session.failures.push(FileFailure {
                        filename: file.filename,
                        error: FileError::Hashing(err.to_string()),
                    });
                    continue;
                }
            };

            session.phase = BatchPhase::Classifying;
            let probe = DuplicateProbe::new(file.filename.clone(), &fp);
            let response = match self.lookup.check(&probe).await {
                Ok(response) => response,
                Err(err) => {
                    // Availability over strict dedup: an unreachable lookup
                    // must never block the batch.
                    warn!(filename = %file.filename, error = %err, "lookup_unavailable");
                    LookupResponse::unique()
                }
            };

            if response.is_duplicate {
                info!(
                    filename = %file.filename,
                    kind = ?response.result.kind,
                    confidence = response.result.confidence,
                    remaining = session.pending.len(),
                    "batch_paused"
                );
                session.active = Some(ActiveDecision {
                    file,
                    fingerprint: fp,
                    result: response.result,
                });
                session.phase = BatchPhase::PausedOnDuplicate;
                return;
            }

            session.phase = BatchPhase::ReadyToUpload;
            self.upload(session, file, fp).await;
        }

        session.phase = BatchPhase::Complete;
        info!(
            uploaded = session.uploaded.len(),
            failed = session.failures.len(),
            skipped = session.skipped.len(),
            "batch_complete"
        );
    }

    /// Flush one cleared file to the upload sink.
    async fn upload(&self, session: &mut BatchSession, file: IncomingFile, fp: FileFingerprint) {
        session.phase = BatchPhase::Uploading;
        let path = format!("{}/{}", self.config.upload_prefix, file.filename);
        let start = Instant::now();
        match self
            .store
            .put(&path, file.bytes.clone(), &file.content_type)
            .await
        {
            Ok(url) => {
                let elapsed_micros = start.elapsed().as_micros();
                info!(filename = %file.filename, url = %url, elapsed_micros, "file_uploaded");
                session.uploaded.push(UploadedFile {
                    filename: file.filename,
                    url,
                    fingerprint: fp,
                });
            }
            Err(err) => {
                warn!(filename = %file.filename, error = %err, "file_upload_failed");
                session.failures.push(FileFailure {
                    filename: file.filename,
                    error: FileError::Persistence(err.to_string()),
                });
            }
        }
    }
}
