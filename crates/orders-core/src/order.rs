//! Order types.
//!
//! An [`Order`] is the unit persisted by the order store. Its line items are
//! carried as an opaque payload: the store never inspects them, it only has to
//! hand them back exactly as they were written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CustomerId, ItemId, OrderId};

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The catalogue item being ordered.
    pub item_id: ItemId,

    /// Number of units.
    pub quantity: u32,

    /// Unit price in the smallest currency unit.
    pub price: u64,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Primary identifier, embedded in the storage key.
    pub order_id: OrderId,

    /// The customer who placed the order.
    pub customer_id: CustomerId,

    /// Ordered line items.
    pub line_items: Vec<LineItem>,

    /// When the order was placed. Set once at creation.
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new order with a freshly generated ID, stamped with the current time.
    #[must_use]
    pub fn new(customer_id: CustomerId, line_items: Vec<LineItem>) -> Self {
        Self {
            order_id: OrderId::generate(),
            customer_id,
            line_items,
            created_at: Some(Utc::now()),
        }
    }
}
