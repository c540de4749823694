//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

use crate::keys::ORDER_INDEX;

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// The primary key space: `order:<id>` → JSON-encoded order.
    pub const PRIMARY: &str = "primary";

    /// The order index set. Keys are members; values are empty.
    pub const ORDERS: &str = crate::keys::ORDER_INDEX;
}

/// Named sets stored as column families of the same name.
pub const SETS: &[&str] = &[ORDER_INDEX];

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    let mut families = vec![cf::PRIMARY];
    families.extend_from_slice(SETS);
    families
}

/// Whether `name` is a set this schema knows how to store.
#[must_use]
pub fn is_set(name: &str) -> bool {
    SETS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_set_is_a_column_family() {
        assert!(all_column_families().contains(&cf::ORDERS));
        assert!(is_set("orders"));
        assert!(!is_set(cf::PRIMARY));
    }
}
