use serde::{Deserialize, Serialize};
use shelfscan_core::MasterProduct;

/// Minimum digits a GTIN cell must carry to be kept.
pub const MIN_GTIN_DIGITS: usize = 8;

/// One usable catalog row, GTIN text still as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub gtin: String,
    pub name: String,
}

impl CatalogRow {
    pub fn to_product(&self) -> MasterProduct {
        MasterProduct::new(&self.gtin, self.name.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOptions {
    /// Field delimiter; sniffed from the first line when `None`.
    pub delimiter: Option<u8>,
}

/// What one ingestion pass kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub rows: Vec<CatalogRow>,
    pub header_skipped: bool,
    /// Rows with fewer than [`MIN_GTIN_DIGITS`] digits or an empty name.
    pub dropped: usize,
}

impl IngestReport {
    pub fn products(&self) -> Vec<MasterProduct> {
        self.rows.iter().map(CatalogRow::to_product).collect()
    }
}
