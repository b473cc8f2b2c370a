//! Scan failure kinds.
//!
//! None of these abort processing. They end up on the returned record
//! (`error_message`, `expiry_status`, `match_type`) so callers can branch on them.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("empty or non-text input")]
    EmptyInput,

    #[error("no GTIN (01) found in payload")]
    NoGtinFound,

    #[error("malformed expiry date '{0}'")]
    MalformedDate(String),

    #[error("no catalog loaded")]
    NoCatalogLoaded,
}
