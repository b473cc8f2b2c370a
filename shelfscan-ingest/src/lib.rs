//! shelfscan-ingest: catalog file ingestion (CSV/TSV) feeding the master index.

pub mod catalog_csv;
pub mod types;

pub use catalog_csv::{
    detect_delimiter, parse_catalog_csv, parse_catalog_reader, parse_catalog_str,
};
pub use types::{CatalogOptions, CatalogRow, IngestReport};
