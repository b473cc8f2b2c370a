//! shelfscan-core: GS1 payload parsing, expiry classification and catalog matching

pub mod ai;
pub mod catalog;
pub mod error;
pub mod expiry;
pub mod extract;
pub mod index;
pub mod matcher;
pub mod scan;
pub mod types;

pub use ai::{
    ai_length, decode, decode_payload, decode_raw, normalize_payload, Decoded, GROUP_SEPARATOR,
};
pub use catalog::{Catalog, IndexSnapshot};
pub use error::ScanError;
pub use expiry::{
    classify, classify_with_window, days_in_month, normalize_date, NormalizedDate,
    SOON_WINDOW_DAYS,
};
pub use extract::extract;
pub use index::{build_index, canonical_gtin, CatalogEntry, MasterIndex, MasterProduct};
pub use matcher::match_product;
pub use scan::{parse_scan, process_scan, process_scan_with_window, resolve_scan};
pub use types::{ExpiryStatus, MatchResult, MatchType, ParsedScan, ScanRecord};
