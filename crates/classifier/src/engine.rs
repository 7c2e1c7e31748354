//! The classification decision procedure.

use fingerprint::{FileFingerprint, HASH_BITS};

use crate::types::{CatalogRecord, ClassifierConfig, MatchKind, MatchResult};

/// Normalize a filename for comparison: trimmed and lowercased.
pub fn normalize_filename(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Classify a new upload against a set of candidate catalog records.
///
/// Pure function with no side effects; how the candidate set is scoped
/// (recency, status, tenant) is the caller's concern. The decision order is
/// first-match-wins:
///
/// 1. **exact** — a candidate's content hash equals the new one (confidence
///    100);
/// 2. **similar** — the perceptually closest candidate within the configured
///    Hamming cutoff (confidence scales with bit agreement);
/// 3. **filename** — a candidate shares the normalized filename but has a
///    different content hash (confidence is the configured split depending
///    on whether byte sizes agree);
/// 4. **none**.
pub fn classify(
    fp: &FileFingerprint,
    filename: &str,
    candidates: &[CatalogRecord],
    cfg: &ClassifierConfig,
) -> MatchResult {
    if let Some(record) = candidates
        .iter()
        .find(|c| c.content_hash == fp.content_hash)
    {
        return MatchResult {
            kind: MatchKind::Exact,
            confidence: 100,
            matched: Some(record.clone()),
        };
    }

    // Closest candidate wins among those inside the cutoff.
    let mut best: Option<(u32, &CatalogRecord)> = None;
    for candidate in candidates {
        let distance = fp
            .perceptual_hash
            .hamming_distance(candidate.perceptual_hash);
        if distance <= cfg.similar_max_distance
            && best.map_or(true, |(best_distance, _)| distance < best_distance)
        {
            best = Some((distance, candidate));
        }
    }
    if let Some((distance, record)) = best {
        return MatchResult {
            kind: MatchKind::Similar,
            confidence: similarity_confidence(distance),
            matched: Some(record.clone()),
        };
    }

    let wanted = normalize_filename(filename);
    if let Some(record) = candidates
        .iter()
        .find(|c| normalize_filename(&c.filename) == wanted)
    {
        let confidence = if record.byte_size == fp.byte_size {
            cfg.filename_size_match_confidence
        } else {
            cfg.filename_only_confidence
        };
        return MatchResult {
            kind: MatchKind::Filename,
            confidence,
            matched: Some(record.clone()),
        };
    }

    MatchResult::none()
}

/// Confidence for a perceptual match: the fraction of agreeing bits, scaled
/// to 0–100. Distance zero yields 100.
fn similarity_confidence(distance: u32) -> u8 {
    ((HASH_BITS - distance) * 100 / HASH_BITS) as u8
}
