//! The counter-store seam and an in-memory implementation.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by a counter store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CounterError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
    #[error("counter update rejected: {0}")]
    Rejected(String),
}

/// External per-tag usage counter store.
///
/// Both operations act on a single counter and must be atomic on the store
/// side. In particular, `decrement` floors at zero **inside the store** —
/// never via a client read-then-write, which would race with concurrent
/// editors. Both operations are safe to retry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one to the counter and stamp its last-used time.
    async fn increment(
        &self,
        category: &str,
        tag: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CounterError>;

    /// Atomically subtract one from the counter, flooring at zero.
    async fn decrement(&self, category: &str, tag: &str) -> Result<(), CounterError>;
}

/// One counter's current value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterEntry {
    pub count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

/// In-memory counter store for tests and embedded use.
///
/// A mutex around a map stands in for the remote store's single-row atomic
/// operations; the zero floor lives in `decrement` itself via saturating
/// arithmetic.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<BTreeMap<(String, String), CounterEntry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for one tag; zero when never incremented.
    pub fn count(&self, category: &str, tag: &str) -> u64 {
        self.lock()
            .get(&(category.to_string(), tag.to_string()))
            .map(|e| e.count)
            .unwrap_or(0)
    }

    /// Last-used stamp for one tag, if it was ever incremented.
    pub fn last_used(&self, category: &str, tag: &str) -> Option<DateTime<Utc>> {
        self.lock()
            .get(&(category.to_string(), tag.to_string()))
            .and_then(|e| e.last_used)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), CounterEntry>> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(
        &self,
        category: &str,
        tag: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CounterError> {
        let mut counters = self.lock();
        let entry = counters
            .entry((category.to_string(), tag.to_string()))
            .or_default();
        entry.count += 1;
        entry.last_used = Some(at);
        Ok(())
    }

    async fn decrement(&self, category: &str, tag: &str) -> Result<(), CounterError> {
        let mut counters = self.lock();
        if let Some(entry) = counters.get_mut(&(category.to_string(), tag.to_string())) {
            entry.count = entry.count.saturating_sub(1);
        }
        Ok(())
    }
}
