//! Key layout for the order store.
//!
//! Primary keys are `order:<id>` with the order ID in decimal. The secondary
//! index is a single set named `orders` whose members are those primary keys.
//! Both names are part of the persisted format.

use orders_core::OrderId;

/// Name of the secondary index set.
pub const ORDER_INDEX: &str = "orders";

/// Prefix shared by every primary key.
pub const ORDER_KEY_PREFIX: &str = "order:";

/// Glob matching every primary key in the index.
pub const ORDER_KEY_PATTERN: &str = "order:*";

/// Create the primary key for an order.
#[must_use]
pub fn order_key(order_id: OrderId) -> String {
    format!("{ORDER_KEY_PREFIX}{order_id}")
}

/// Extract the order ID from a primary key.
///
/// Returns `None` if the key does not have the `order:<decimal>` shape.
#[must_use]
pub fn order_id_from_key(key: &str) -> Option<OrderId> {
    key.strip_prefix(ORDER_KEY_PREFIX)?.parse().ok()
}

/// Translate a pagination cursor into the index member the scan resumes at.
///
/// Cursor `0` starts from the beginning of the index.
#[must_use]
pub fn cursor_start(cursor: u64) -> Option<String> {
    (cursor != 0).then(|| order_key(OrderId::new(cursor)))
}

/// Translate the index member a scan stopped at into the next cursor.
///
/// Returns `None` if the member is not a primary key.
#[must_use]
pub fn cursor_for(member: &str) -> Option<u64> {
    order_id_from_key(member).map(OrderId::get)
}
