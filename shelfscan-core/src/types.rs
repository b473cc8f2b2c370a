use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScanError;
use crate::index::CatalogEntry;

/// Where an expiry date sits relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Missing,
    Expired,
    Soon,
    Ok,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Missing => "missing",
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::Soon => "soon",
            ExpiryStatus::Ok => "ok",
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scan was resolved against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "EXACT")]
    Exact,
    #[serde(rename = "LAST8")]
    Last8,
    #[serde(rename = "SEQ6")]
    Seq6,
    #[serde(rename = "AMBIGUOUS-LAST8")]
    AmbiguousLast8,
    #[serde(rename = "AMBIGUOUS-SEQ6")]
    AmbiguousSeq6,
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "INVALID")]
    Invalid,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "EXACT",
            MatchType::Last8 => "LAST8",
            MatchType::Seq6 => "SEQ6",
            MatchType::AmbiguousLast8 => "AMBIGUOUS-LAST8",
            MatchType::AmbiguousSeq6 => "AMBIGUOUS-SEQ6",
            MatchType::None => "NONE",
            MatchType::Invalid => "INVALID",
        }
    }

    /// Only these outcomes carry a product name.
    pub fn is_resolved(&self) -> bool {
        matches!(self, MatchType::Exact | MatchType::Last8 | MatchType::Seq6)
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, MatchType::AmbiguousLast8 | MatchType::AmbiguousSeq6)
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields pulled out of one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedScan {
    pub raw_input: String,
    pub valid: bool,
    /// Empty, or exactly 14 digits.
    pub gtin14: String,
    /// Empty, or `gtin14` without its leading zero (or equal to it when there is none).
    pub gtin13: String,
    /// The 6-digit AI 17 value as scanned, kept even when it fails to normalize.
    pub expiry_raw: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub expiry_display: Option<String>,
    pub expiry_status: ExpiryStatus,
    pub batch: Option<String>,
    pub serial: Option<String>,
    pub quantity: String,
    /// `NONE` (or `INVALID`) out of extraction; [`crate::scan::resolve_scan`] sets the matched outcome.
    pub match_type: MatchType,
    #[serde(skip)]
    pub error: Option<ScanError>,
    /// Characters the raw decoder dropped because no AI started there.
    pub skipped_chars: usize,
}

impl ParsedScan {
    pub fn invalid(raw_input: &str, error: ScanError) -> Self {
        Self {
            raw_input: raw_input.to_string(),
            valid: false,
            gtin14: String::new(),
            gtin13: String::new(),
            expiry_raw: None,
            expiry: None,
            expiry_display: None,
            expiry_status: ExpiryStatus::Missing,
            batch: None,
            serial: None,
            quantity: "1".to_string(),
            match_type: MatchType::Invalid,
            error: Some(error),
            skipped_chars: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Empty unless `match_type.is_resolved()`.
    pub name: String,
    pub match_type: MatchType,
    /// Distinct catalog rows the deciding tier found (all of them when ambiguous).
    pub candidates: Vec<CatalogEntry>,
}

impl MatchResult {
    pub fn unresolved(match_type: MatchType) -> Self {
        Self {
            name: String::new(),
            match_type,
            candidates: Vec::new(),
        }
    }

    pub fn resolved(match_type: MatchType, entry: CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            match_type,
            candidates: vec![entry],
        }
    }

    pub fn ambiguous(match_type: MatchType, candidates: Vec<CatalogEntry>) -> Self {
        Self {
            name: String::new(),
            match_type,
            candidates,
        }
    }
}

/// Flat output record handed to history and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub raw_input: String,
    pub gtin14: String,
    pub gtin13: String,
    pub expiry_iso: String,
    pub expiry_display: String,
    pub expiry_status: ExpiryStatus,
    pub batch: String,
    pub serial: String,
    pub quantity: String,
    pub product_name: String,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ScanRecord {
    pub fn from_parts(scan: &ParsedScan, result: &MatchResult) -> Self {
        Self {
            raw_input: scan.raw_input.clone(),
            gtin14: scan.gtin14.clone(),
            gtin13: scan.gtin13.clone(),
            expiry_iso: scan
                .expiry
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            expiry_display: scan.expiry_display.clone().unwrap_or_default(),
            expiry_status: scan.expiry_status,
            batch: scan.batch.clone().unwrap_or_default(),
            serial: scan.serial.clone().unwrap_or_default(),
            quantity: scan.quantity.clone(),
            product_name: result.name.clone(),
            match_type: result.match_type,
            error_message: scan.error.as_ref().map(|e| e.to_string()),
        }
    }
}
