//! Tag-usage accounting.
//!
//! Whenever an image's tag selections change — a save, an edit, a bulk edit,
//! or a deletion — the ledger computes which tags were added and removed
//! ([`diff_tags`]) and issues one atomic counter update per tag against an
//! external [`CounterStore`].
//!
//! ## Consistency model
//!
//! Counter updates for different tags in one diff are independent remote
//! operations, not one multi-row transaction: a crash mid-diff can leave the
//! counts partially applied. Usage counts are advisory analytics, so a
//! counter failure is logged and swallowed — it must never roll back or
//! block the primary tag save. The zero floor on decrement is enforced
//! inside the store's atomic operation, never by client-side checking.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};
use vocab::{TagState, VocabularySchema};

mod diff;
mod store;

pub use crate::diff::{diff_tags, TagDiff};
pub use crate::store::{CounterEntry, CounterError, CounterStore, MemoryCounterStore};

/// Outcome of applying one diff: how many counter updates succeeded and how
/// many were logged and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerReport {
    pub applied: usize,
    pub failed: usize,
}

impl LedgerReport {
    fn merge(&mut self, other: LedgerReport) {
        self.applied += other.applied;
        self.failed += other.failed;
    }
}

/// Keeps per-tag usage counters consistent with actual tag assignments.
pub struct TagUsageLedger<S> {
    store: S,
}

impl<S: CounterStore> TagUsageLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying counter store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply a precomputed diff, one atomic counter update at a time.
    ///
    /// Updates run sequentially to bound load on the store and keep per-tag
    /// failures isolated. Failures are demoted to warnings; the returned
    /// report says how many updates landed.
    pub async fn apply_diff(&self, diffs: &BTreeMap<String, TagDiff>) -> LedgerReport {
        let mut report = LedgerReport::default();
        for (category, diff) in diffs {
            if diff.is_empty() {
                continue;
            }
            for tag in &diff.added {
                match self.store.increment(category, tag, Utc::now()).await {
                    Ok(()) => report.applied += 1,
                    Err(err) => {
                        warn!(category = %category, tag = %tag, error = %err, "counter_update_failed");
                        report.failed += 1;
                    }
                }
            }
            for tag in &diff.removed {
                match self.store.decrement(category, tag).await {
                    Ok(()) => report.applied += 1,
                    Err(err) => {
                        warn!(category = %category, tag = %tag, error = %err, "counter_update_failed");
                        report.failed += 1;
                    }
                }
            }
        }
        debug!(applied = report.applied, failed = report.failed, "ledger_diff_applied");
        report
    }

    /// Record an edit: diff old against new and apply.
    pub async fn record_save(
        &self,
        old: &TagState,
        new: &TagState,
        schema: &VocabularySchema,
    ) -> LedgerReport {
        self.apply_diff(&diff_tags(old, new, schema)).await
    }

    /// Record a newly saved image: everything in `new` counts as added.
    pub async fn record_create(&self, new: &TagState, schema: &VocabularySchema) -> LedgerReport {
        self.record_save(&TagState::new(), new, schema).await
    }

    /// Record a deletion: everything in `old` counts as removed.
    pub async fn record_delete(&self, old: &TagState, schema: &VocabularySchema) -> LedgerReport {
        self.record_save(old, &TagState::new(), schema).await
    }

    /// Record a bulk edit: one diff per affected image, applied sequentially.
    pub async fn record_bulk_edit(
        &self,
        edits: &[(TagState, TagState)],
        schema: &VocabularySchema,
    ) -> LedgerReport {
        let mut report = LedgerReport::default();
        for (old, new) in edits {
            report.merge(self.record_save(old, new, schema).await);
        }
        report
    }
}
