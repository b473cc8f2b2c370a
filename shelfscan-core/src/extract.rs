//! Field extraction from a bracketed `(AI)value` string.
//!
//! Only AIs 01, 17, 10, 21 and 30 are read. Any other bracketed AI is left in
//! place and simply never matched.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ScanError;
use crate::types::{ExpiryStatus, MatchType, ParsedScan};

static GTIN14_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(01\)([0-9]{14})").expect("static regex"));

// Short GTIN-12/13 fallback, padded up to 14 below.
static GTIN_SHORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(01\)([0-9]{12,13})").expect("static regex"));

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(17\)([0-9]{6})").expect("static regex"));

// Variable fields stop at the next `(NN)` marker, a group separator, or the end of input.
static BATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(10\)([A-Za-z0-9\-/.\s]+?)(?:\([0-9]{2}\)|\x1D|$)").expect("static regex")
});

static SERIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(21\)([A-Za-z0-9\-/.\s]+?)(?:\([0-9]{2}\)|\x1D|$)").expect("static regex")
});

static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(30\)([0-9]+)").expect("static regex"));

fn capture(re: &Regex, s: &str) -> Option<String> {
    re.captures(s).map(|caps| caps[1].to_string())
}

fn capture_trimmed(re: &Regex, s: &str) -> Option<String> {
    capture(re, s)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn pad_left(digits: &str, width: usize) -> String {
    format!("{:0>width$}", digits, width = width)
}

/// GTIN-13 view of a 14-digit GTIN: one leading zero dropped, if there is one.
pub fn gtin13_of(gtin14: &str) -> String {
    gtin14.strip_prefix('0').unwrap_or(gtin14).to_string()
}

/// Pull GTIN, expiry, batch, serial and quantity out of a bracketed string.
///
/// The expiry is returned raw (`expiry_raw`); normalization happens in the scan
/// pipeline because it needs "today". The match type stays `NONE` until the
/// matcher runs, except for invalid scans which are `INVALID` straight away.
pub fn extract(bracketed: &str) -> ParsedScan {
    if bracketed.trim().is_empty() {
        return ParsedScan::invalid(bracketed, ScanError::EmptyInput);
    }

    let gtin14 = match capture(&GTIN14_RE, bracketed) {
        Some(g) => g,
        None => match capture(&GTIN_SHORT_RE, bracketed) {
            Some(short) => pad_left(&pad_left(&short, 13), 14),
            None => return ParsedScan::invalid(bracketed, ScanError::NoGtinFound),
        },
    };

    ParsedScan {
        raw_input: bracketed.to_string(),
        valid: true,
        gtin13: gtin13_of(&gtin14),
        gtin14,
        expiry_raw: capture(&EXPIRY_RE, bracketed),
        expiry: None,
        expiry_display: None,
        expiry_status: ExpiryStatus::Missing,
        batch: capture_trimmed(&BATCH_RE, bracketed),
        serial: capture_trimmed(&SERIAL_RE, bracketed),
        quantity: capture(&QUANTITY_RE, bracketed).unwrap_or_else(|| "1".to_string()),
        match_type: MatchType::None,
        error: None,
        skipped_chars: 0,
    }
}
