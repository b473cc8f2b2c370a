//! Tiered product matching.
//!
//! Tiers run in order and the first one that reaches a decision wins:
//! 1) exact GTIN-14, 2) exact GTIN-13, 3) last 8 digits, 4) any 6-digit window
//! of the last 10 digits found inside a catalog GTIN. A tier that finds more
//! than one distinct product reports the ambiguity instead of picking one.

use log::debug;
use std::collections::BTreeMap;

use crate::error::ScanError;
use crate::index::{canonical_gtin, last_n, CatalogEntry, MasterIndex};
use crate::types::{MatchResult, MatchType, ParsedScan};

const SEQ_WINDOW: usize = 6;

fn entry(gtin: &str, name: &str) -> CatalogEntry {
    CatalogEntry {
        gtin: gtin.to_string(),
        name: name.to_string(),
    }
}

fn exact_tier(scan: &ParsedScan, index: &MasterIndex) -> Option<MatchResult> {
    for key in [&scan.gtin14, &scan.gtin13] {
        if key.is_empty() {
            continue;
        }
        if let Some(name) = index.lookup_exact(key) {
            return Some(MatchResult::resolved(
                MatchType::Exact,
                entry(&canonical_gtin(key), name),
            ));
        }
    }
    None
}

fn last8_tier(gtin14: &str, index: &MasterIndex) -> Option<MatchResult> {
    let bucket = index.last8_bucket(last_n(gtin14, 8));

    let mut distinct: Vec<CatalogEntry> = Vec::new();
    for e in bucket {
        if !distinct.iter().any(|d| d.gtin == e.gtin) {
            distinct.push(e.clone());
        }
    }

    match distinct.len() {
        0 => None,
        1 => distinct
            .pop()
            .map(|only| MatchResult::resolved(MatchType::Last8, only)),
        _ => Some(MatchResult::ambiguous(MatchType::AmbiguousLast8, distinct)),
    }
}

fn seq6_tier(gtin14: &str, index: &MasterIndex) -> MatchResult {
    let tail = last_n(gtin14, 10);
    let windows: Vec<&str> = (0..=tail.len().saturating_sub(SEQ_WINDOW))
        .filter(|&i| i + SEQ_WINDOW <= tail.len())
        .map(|i| &tail[i..i + SEQ_WINDOW])
        .collect();

    // Keyed by canonical GTIN so the 13- and 14-digit keys of one product collapse.
    let mut found: BTreeMap<String, String> = BTreeMap::new();
    for (key, name) in index.exact_entries() {
        if windows.iter().any(|w| key.contains(w)) {
            found
                .entry(canonical_gtin(key))
                .or_insert_with(|| name.to_string());
        }
    }

    let mut candidates: Vec<CatalogEntry> = found
        .into_iter()
        .map(|(gtin, name)| CatalogEntry { gtin, name })
        .collect();

    match candidates.len() {
        0 => MatchResult::unresolved(MatchType::None),
        1 => match candidates.pop() {
            Some(only) => MatchResult::resolved(MatchType::Seq6, only),
            None => MatchResult::unresolved(MatchType::None),
        },
        _ => MatchResult::ambiguous(MatchType::AmbiguousSeq6, candidates),
    }
}

/// Resolve a parsed scan against a built index.
pub fn match_product(scan: &ParsedScan, index: &MasterIndex) -> MatchResult {
    if !scan.valid || scan.gtin14.is_empty() {
        return MatchResult::unresolved(MatchType::Invalid);
    }
    if index.is_empty() {
        debug!("{}; {} left unmatched", ScanError::NoCatalogLoaded, scan.gtin14);
        return MatchResult::unresolved(MatchType::None);
    }

    let result = exact_tier(scan, index)
        .or_else(|| last8_tier(&scan.gtin14, index))
        .unwrap_or_else(|| seq6_tier(&scan.gtin14, index));

    debug!(
        "{} -> {} ({} candidate(s))",
        scan.gtin14,
        result.match_type,
        result.candidates.len()
    );
    result
}
