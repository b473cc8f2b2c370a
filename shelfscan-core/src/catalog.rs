//! Published catalog: the row set plus the index built from it.
//!
//! Every change rebuilds the whole index off to the side and then swaps the
//! published `Arc`. Readers hold an [`IndexSnapshot`] and keep matching against
//! that generation no matter what writers do afterwards.

use log::debug;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::index::{build_index, MasterIndex, MasterProduct};

/// One published generation of the index.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub generation: u64,
    pub index: Arc<MasterIndex>,
}

#[derive(Debug)]
pub struct Catalog {
    rows: Mutex<Vec<MasterProduct>>,
    published: RwLock<IndexSnapshot>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            published: RwLock::new(IndexSnapshot {
                generation: 0,
                index: Arc::new(MasterIndex::default()),
            }),
        }
    }

    /// Replace all rows. Returns the new generation.
    pub fn load(&self, products: Vec<MasterProduct>) -> u64 {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        *rows = products;
        self.publish(&rows)
    }

    /// Add rows after the existing ones. Returns the new generation.
    pub fn append(&self, products: impl IntoIterator<Item = MasterProduct>) -> u64 {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        rows.extend(products);
        self.publish(&rows)
    }

    /// Drop every row. Returns the new generation.
    pub fn clear(&self) -> u64 {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        rows.clear();
        self.publish(&rows)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The currently published index.
    pub fn snapshot(&self) -> IndexSnapshot {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // Called with the rows lock held, so generations publish in order.
    fn publish(&self, rows: &[MasterProduct]) -> u64 {
        let index = Arc::new(build_index(rows));
        let mut published = self.published.write().unwrap_or_else(PoisonError::into_inner);
        let generation = published.generation + 1;
        *published = IndexSnapshot { generation, index };
        debug!("published catalog generation {generation} ({} rows)", rows.len());
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn p(gtin: &str, name: &str) -> MasterProduct {
        MasterProduct::new(gtin, name)
    }

    #[test]
    fn test_new_catalog_is_empty_generation_zero() {
        let c = Catalog::new();
        let snap = c.snapshot();
        assert_eq!(snap.generation, 0);
        assert!(snap.index.is_empty());
        assert!(c.is_empty());
    }

    #[test]
    fn test_load_append_clear_bump_generation() {
        let c = Catalog::new();
        assert_eq!(c.load(vec![p("6297000001234", "Dates")]), 1);
        assert_eq!(c.append(vec![p("7311100005555", "Coffee")]), 2);
        assert_eq!(c.len(), 2);
        assert_eq!(c.snapshot().index.product_count(), 2);
        assert_eq!(c.clear(), 3);
        assert!(c.snapshot().index.is_empty());
    }

    #[test]
    fn test_old_snapshot_survives_swap() {
        let c = Catalog::new();
        c.load(vec![p("6297000001234", "Dates")]);
        let before = c.snapshot();
        c.clear();
        assert_eq!(before.index.lookup_exact("06297000001234"), Some("Dates"));
        assert!(c.snapshot().index.lookup_exact("06297000001234").is_none());
    }

    #[test]
    fn test_readers_see_whole_generations() {
        let c = Arc::new(Catalog::new());
        let writer = {
            let c = Arc::clone(&c);
            thread::spawn(move || {
                for i in 0..50u64 {
                    let rows = (0..=i)
                        .map(|n| p(&format!("{:08}", n), &format!("item {n}")))
                        .collect();
                    c.load(rows);
                }
            })
        };

        for _ in 0..200 {
            let snap = c.snapshot();
            // generation g was built from exactly g rows
            assert_eq!(snap.index.product_count() as u64, snap.generation);
        }
        writer.join().unwrap();
        assert_eq!(c.snapshot().generation, 50);
    }
}
