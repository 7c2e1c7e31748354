//! Similarity classification for the reference-image catalog.
//!
//! Given the fingerprint of a new upload and a set of candidate
//! [`CatalogRecord`]s, [`classify`] places the upload in one of four tiers —
//! `exact`, `similar`, `filename`, or `none` — with a 0–100 confidence. The
//! function is pure: candidate retrieval, persistence, and the pause/resume
//! flow around a detected duplicate all live elsewhere.

mod engine;
mod types;

pub use crate::engine::{classify, normalize_filename};
pub use crate::types::{
    CatalogRecord, ClassifierConfig, ClassifierConfigError, MatchKind, MatchResult, RecordStatus,
};
