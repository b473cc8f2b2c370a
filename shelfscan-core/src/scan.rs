//! Scan pipeline: raw payload -> decoded -> extracted -> dated -> matched.

use chrono::NaiveDate;
use log::debug;

use crate::ai::{decode_payload, normalize_payload};
use crate::expiry::{classify_with_window, normalize_date, SOON_WINDOW_DAYS};
use crate::extract::extract;
use crate::index::MasterIndex;
use crate::matcher::match_product;
use crate::types::{MatchResult, ParsedScan, ScanRecord};

/// Parse one payload. `today` anchors the expiry status.
pub fn parse_scan(raw: &str, today: NaiveDate) -> ParsedScan {
    parse_scan_with_window(raw, today, SOON_WINDOW_DAYS)
}

fn parse_scan_with_window(raw: &str, today: NaiveDate, soon_days: i64) -> ParsedScan {
    let decoded = decode_payload(&normalize_payload(raw));

    let mut scan = extract(&decoded.text);
    scan.raw_input = raw.to_string();
    scan.skipped_chars = decoded.skipped_chars;

    if let Some(value) = scan.expiry_raw.as_deref() {
        match normalize_date(value) {
            Ok(norm) => {
                scan.expiry = Some(norm.date);
                scan.expiry_display = Some(norm.display);
            }
            Err(e) => debug!("{e}; expiry treated as missing"),
        }
    }
    scan.expiry_status = classify_with_window(scan.expiry, today, soon_days);
    scan
}

/// Parse and match one payload into the flat output record.
pub fn process_scan(raw: &str, index: &MasterIndex, today: NaiveDate) -> ScanRecord {
    process_scan_with_window(raw, index, today, SOON_WINDOW_DAYS)
}

/// Parse and match one payload, writing the outcome back onto the scan.
pub fn resolve_scan(
    raw: &str,
    index: &MasterIndex,
    today: NaiveDate,
    soon_days: i64,
) -> (ParsedScan, MatchResult) {
    let mut scan = parse_scan_with_window(raw, today, soon_days);
    let result = match_product(&scan, index);
    scan.match_type = result.match_type;
    (scan, result)
}

/// [`process_scan`] with a custom "soon" window in days.
pub fn process_scan_with_window(
    raw: &str,
    index: &MasterIndex,
    today: NaiveDate,
    soon_days: i64,
) -> ScanRecord {
    let (scan, result) = resolve_scan(raw, index, today, soon_days);
    ScanRecord::from_parts(&scan, &result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::types::{ExpiryStatus, MatchType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_raw_payload_is_decoded_before_extraction() {
        let s = parse_scan("]C1010629700000123417250630<GS>10ABC001", today());
        assert!(s.valid);
        assert_eq!(s.gtin14, "06297000001234");
        assert_eq!(s.batch.as_deref(), Some("ABC001"));
        assert_eq!(s.expiry_status, ExpiryStatus::Soon);
        assert_eq!(s.raw_input, "]C1010629700000123417250630<GS>10ABC001");
        assert_eq!(s.skipped_chars, 0);
    }

    #[test]
    fn test_malformed_date_degrades_to_missing() {
        let s = parse_scan("(01)06297000001234(17)250231", today());
        assert!(s.valid);
        assert_eq!(s.expiry_raw.as_deref(), Some("250231"));
        assert_eq!(s.expiry, None);
        assert_eq!(s.expiry_status, ExpiryStatus::Missing);
        assert_eq!(s.error, None);
    }

    #[test]
    fn test_skipped_chars_are_reported() {
        let s = parse_scan("X0106297000001234", today());
        assert_eq!(s.skipped_chars, 1);
        assert_eq!(s.gtin14, "06297000001234");
    }

    #[test]
    fn test_bracketed_payload_with_separators_keeps_fields() {
        let s = parse_scan("(01)06297000001234(10)ABC001<GS>(21)SN123", today());
        assert_eq!(s.batch.as_deref(), Some("ABC001"));
        assert_eq!(s.serial.as_deref(), Some("SN123"));

        let s = parse_scan("(01)06297000001234(10)ABC001\u{1D}(21)SN123", today());
        assert_eq!(s.batch.as_deref(), Some("ABC001"));

        let s = parse_scan("(01)06297000001234(21)SN123\u{1D}", today());
        assert_eq!(s.serial.as_deref(), Some("SN123"));
    }

    #[test]
    fn test_resolve_scan_carries_match_type() {
        use crate::index::{build_index, MasterProduct};

        let idx = build_index(&[MasterProduct::new("6297000001234", "Dates 500g")]);
        let (scan, result) = resolve_scan("(01)06297000001234", &idx, today(), 30);
        assert_eq!(scan.match_type, MatchType::Exact);
        assert_eq!(result.name, "Dates 500g");

        let (scan, _) = resolve_scan("(17)250630", &idx, today(), 30);
        assert_eq!(scan.match_type, MatchType::Invalid);
    }

    #[test]
    fn test_empty_input_record() {
        let r = process_scan("  ", &MasterIndex::default(), today());
        assert_eq!(r.match_type, MatchType::Invalid);
        assert_eq!(r.error_message, Some(ScanError::EmptyInput.to_string()));
        assert_eq!(r.quantity, "1");
    }
}
