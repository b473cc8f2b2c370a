//! Master catalog index: exact GTIN map plus a last-8-digit multimap.
//!
//! An index is built once from the full product list and never mutated
//! afterwards. Catalog changes build a new one (see [`crate::catalog`]).

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strip non-digits and left-pad with zeros to 14 digits.
///
/// Longer digit runs are kept as they are.
pub fn canonical_gtin(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{:0>14}", digits)
}

/// Rightmost `n` characters of an all-digit string (the whole string when shorter).
pub(crate) fn last_n(digits: &str, n: usize) -> &str {
    &digits[digits.len().saturating_sub(n)..]
}

/// One catalog row with its GTIN already canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterProduct {
    gtin: String,
    name: String,
}

impl MasterProduct {
    pub fn new(gtin_raw: &str, name: impl Into<String>) -> Self {
        Self {
            gtin: canonical_gtin(gtin_raw),
            name: name.into(),
        }
    }

    pub fn gtin(&self) -> &str {
        &self.gtin
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A `(gtin, name)` pair as stored in last-8 buckets and reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub gtin: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct MasterIndex {
    exact: HashMap<String, String>,
    last8: HashMap<String, Vec<CatalogEntry>>,
    product_count: usize,
}

impl MasterIndex {
    /// True when no product has been indexed (the matcher answers `NONE`).
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Rows the index was built from, duplicates included.
    pub fn product_count(&self) -> usize {
        self.product_count
    }

    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    pub fn lookup_exact(&self, gtin: &str) -> Option<&str> {
        self.exact.get(gtin).map(String::as_str)
    }

    /// Catalog rows whose canonical GTIN ends in `suffix`, in catalog order.
    pub fn last8_bucket(&self, suffix: &str) -> &[CatalogEntry] {
        self.last8.get(suffix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every `(key, name)` in the exact map; keys are 14- or 13-digit GTINs.
    pub fn exact_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exact.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Last-8 suffixes shared by more than one distinct GTIN.
    pub fn last8_collisions(&self) -> usize {
        self.last8
            .values()
            .filter(|bucket| {
                bucket
                    .iter()
                    .any(|e| e.gtin != bucket[0].gtin)
            })
            .count()
    }
}

/// Build a fresh index from the whole product list.
///
/// Later duplicates win in the exact map; the last-8 buckets keep all of them.
pub fn build_index(products: &[MasterProduct]) -> MasterIndex {
    let mut exact: HashMap<String, String> = HashMap::with_capacity(products.len() * 2);
    let mut last8: HashMap<String, Vec<CatalogEntry>> = HashMap::new();

    for p in products {
        exact.insert(p.gtin.clone(), p.name.clone());
        if let Some(short) = p.gtin.strip_prefix('0') {
            exact.insert(short.to_string(), p.name.clone());
        }

        last8
            .entry(last_n(&p.gtin, 8).to_string())
            .or_default()
            .push(CatalogEntry {
                gtin: p.gtin.clone(),
                name: p.name.clone(),
            });
    }

    debug!(
        "built master index: {} products, {} exact keys, {} last-8 buckets",
        products.len(),
        exact.len(),
        last8.len()
    );

    MasterIndex {
        exact,
        last8,
        product_count: products.len(),
    }
}
