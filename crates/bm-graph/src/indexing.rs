//! Stable indexing for the integrator.
//!
//! Maps caller-assigned reservoir keys to contiguous state columns (0..N)
//! and back. Columns follow reservoir insertion order, so the external
//! reservoir always sits in column 0.

use std::collections::HashMap;

use bm_core::ReservoirKey;

/// Bidirectional reservoir key <-> column lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    /// Column -> key.
    keys: Vec<ReservoirKey>,
    /// Key -> column.
    columns: HashMap<ReservoirKey, usize>,
}

impl ColumnMap {
    /// Build a map assigning columns in iteration order.
    pub fn from_keys(keys: impl IntoIterator<Item = ReservoirKey>) -> Self {
        let keys: Vec<ReservoirKey> = keys.into_iter().collect();
        let columns = keys.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        Self { keys, columns }
    }

    pub fn column(&self, key: impl Into<ReservoirKey>) -> Option<usize> {
        self.columns.get(&key.into()).copied()
    }

    pub fn key(&self, column: usize) -> Option<ReservoirKey> {
        self.keys.get(column).copied()
    }

    /// Keys in column order.
    pub fn keys(&self) -> &[ReservoirKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_keys_get_dense_columns() {
        let map = ColumnMap::from_keys([0, 10, 3].map(ReservoirKey));
        assert_eq!(map.len(), 3);
        assert_eq!(map.column(0), Some(0));
        assert_eq!(map.column(10), Some(1));
        assert_eq!(map.column(3), Some(2));
        assert_eq!(map.column(4), None);
        assert_eq!(map.key(1), Some(ReservoirKey(10)));
        assert_eq!(map.key(3), None);
    }
}
