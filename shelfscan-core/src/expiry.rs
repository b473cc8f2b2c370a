//! Expiry dates: AI 17 YYMMDD normalization and status bucketing.

use chrono::NaiveDate;

use crate::error::ScanError;
use crate::types::ExpiryStatus;

/// Days ahead (inclusive) that still count as "soon".
pub const SOON_WINDOW_DAYS: i64 = 30;

/// A normalized AI 17 value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    pub date: NaiveDate,
    /// `DD/MM/YYYY`
    pub display: String,
}

impl NormalizedDate {
    pub fn iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Calendar days in `month` (1-12); 0 for anything else.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn two_digits(s: &str) -> Option<u32> {
    s.parse().ok()
}

/// Normalize a 6-digit `YYMMDD` value.
///
/// The century is always 2000. Day `00` means the last day of the month.
pub fn normalize_date(yymmdd: &str) -> Result<NormalizedDate, ScanError> {
    let malformed = || ScanError::MalformedDate(yymmdd.to_string());

    if yymmdd.len() != 6 || !yymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let yy = two_digits(&yymmdd[0..2]).ok_or_else(malformed)?;
    let month = two_digits(&yymmdd[2..4]).ok_or_else(malformed)?;
    let day = two_digits(&yymmdd[4..6]).ok_or_else(malformed)?;
    let year = 2000 + yy as i32;

    if !(1..=12).contains(&month) {
        return Err(malformed());
    }

    let last_day = days_in_month(year, month);
    let day = if day == 0 { last_day } else { day };
    if day > last_day {
        return Err(malformed());
    }

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)?;
    Ok(NormalizedDate {
        date,
        display: format!("{:02}/{:02}/{:04}", day, month, year),
    })
}

/// Bucket an expiry date against `today` with the default 30-day window.
pub fn classify(expiry: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    classify_with_window(expiry, today, SOON_WINDOW_DAYS)
}

/// Whole days from `today` to `expiry` decide the bucket:
/// negative is expired, `0..=soon_days` is soon, anything later is ok.
pub fn classify_with_window(
    expiry: Option<NaiveDate>,
    today: NaiveDate,
    soon_days: i64,
) -> ExpiryStatus {
    let Some(expiry) = expiry else {
        return ExpiryStatus::Missing;
    };

    let days = (expiry - today).num_days();
    if days < 0 {
        ExpiryStatus::Expired
    } else if days <= soon_days {
        ExpiryStatus::Soon
    } else {
        ExpiryStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_normalize_plain_date() {
        let n = normalize_date("250630").unwrap();
        assert_eq!(n.iso(), "2025-06-30");
        assert_eq!(n.display, "30/06/2025");
    }

    #[test]
    fn test_day_zero_is_last_day_of_month() {
        assert_eq!(normalize_date("250200").unwrap().date, d(2025, 2, 28));
        assert_eq!(normalize_date("240200").unwrap().date, d(2024, 2, 29));
        assert_eq!(normalize_date("251200").unwrap().date, d(2025, 12, 31));
    }

    #[test]
    fn test_impossible_dates_fail() {
        assert_eq!(
            normalize_date("250231"),
            Err(ScanError::MalformedDate("250231".into()))
        );
        assert!(normalize_date("251301").is_err());
        assert!(normalize_date("250032").is_err());
        assert!(normalize_date("2506").is_err());
        assert!(normalize_date("25O630").is_err());
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2100));
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn test_classify_boundaries() {
        let today = d(2025, 6, 1);
        assert_eq!(classify(None, today), ExpiryStatus::Missing);
        assert_eq!(classify(Some(d(2025, 5, 31)), today), ExpiryStatus::Expired);
        assert_eq!(classify(Some(today), today), ExpiryStatus::Soon);
        assert_eq!(classify(Some(d(2025, 7, 1)), today), ExpiryStatus::Soon);
        assert_eq!(classify(Some(d(2025, 7, 2)), today), ExpiryStatus::Ok);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let today = d(2025, 1, 1);
        let rank = |s: ExpiryStatus| match s {
            ExpiryStatus::Expired => 0,
            ExpiryStatus::Soon => 1,
            ExpiryStatus::Ok => 2,
            ExpiryStatus::Missing => unreachable!(),
        };
        let mut prev = 0;
        for offset in -60..=90 {
            let expiry = today + chrono::Duration::days(offset);
            let r = rank(classify(Some(expiry), today));
            assert!(r >= prev, "status went backwards at offset {offset}");
            prev = r;
        }
    }

    #[test]
    fn test_custom_window() {
        let today = d(2025, 6, 1);
        assert_eq!(
            classify_with_window(Some(d(2025, 6, 10)), today, 7),
            ExpiryStatus::Ok
        );
    }
}
