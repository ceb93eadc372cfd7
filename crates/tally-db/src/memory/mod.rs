//! # In-Memory Repositories
//!
//! Process-local implementations of the tally-core repository contracts.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One lock per store                                   │
//! │                                                                         │
//! │  MemoryUnitRepository     RwLock<Table<Unit>>                          │
//! │          ▲                                                              │
//! │          │ read(unit_id)  (before the product lock is taken)           │
//! │  MemoryProductRepository  RwLock<Table<Product>>                       │
//! │          ▲                                                              │
//! │          │ read(product_id) (before the receipt lock is taken)         │
//! │  MemoryReceiptRepository  RwLock<Table<Receipt>>                       │
//! │          ▲                                                              │
//! │          │ read_sales()                                                 │
//! │  MemorySalesRepository    (no state of its own)                        │
//! │                                                                         │
//! │  Every check-then-write (uniqueness scan + insert, status check +      │
//! │  delete, append + total) happens under ONE write guard, so two         │
//! │  concurrent creates cannot both pass the uniqueness scan.              │
//! │  No guard is ever held while another store's lock is awaited.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod receipt;
pub mod sales;
pub mod unit;

pub use product::MemoryProductRepository;
pub use receipt::MemoryReceiptRepository;
pub use sales::MemorySalesRepository;
pub use unit::MemoryUnitRepository;

use std::collections::HashMap;

/// Id-keyed rows that remember insertion order.
#[derive(Debug)]
pub(crate) struct Table<T> {
    rows: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    pub(crate) fn get(&self, id: &str) -> Option<&T> {
        self.rows.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// Inserts a new row. Callers check `contains` first.
    pub(crate) fn insert(&mut self, id: String, row: T) {
        if self.rows.insert(id.clone(), row).is_none() {
            self.order.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<T> {
        let row = self.rows.remove(id)?;
        self.order.retain(|kept| kept != id);
        Some(row)
    }

    /// Rows in insertion order.
    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(move |id| self.rows.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_keeps_insertion_order() {
        let mut table = Table::default();
        table.insert("b".to_string(), 2);
        table.insert("a".to_string(), 1);
        table.insert("c".to_string(), 3);

        assert_eq!(table.values().copied().collect::<Vec<_>>(), vec![2, 1, 3]);

        assert_eq!(table.remove("a"), Some(1));
        assert_eq!(table.values().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert!(!table.contains("a"));
    }

    #[test]
    fn test_table_reinsert_does_not_duplicate_order() {
        let mut table = Table::default();
        table.insert("a".to_string(), 1);
        table.insert("a".to_string(), 2);

        assert_eq!(table.values().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(table.get("a"), Some(&2));
    }
}
