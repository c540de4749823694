//! The order repository.
//!
//! [`OrderRepository`] keeps two pieces of state in step: the primary record
//! at `order:<id>` and that key's membership in the `orders` index set. Every
//! mutation touching both runs inside one backend transaction, so a key is in
//! the index exactly when its record exists, whatever fails along the way.

use orders_core::{Order, OrderId};

use crate::backend::{Backend, Transaction};
use crate::deadline::Deadline;
use crate::error::{Result, StoreError};
use crate::keys::{self, ORDER_INDEX, ORDER_KEY_PATTERN};
use crate::OrderStore;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A request for one page of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindAllPage {
    /// Opaque cursor from the previous page; `0` starts a new scan.
    pub cursor: u64,

    /// Maximum number of orders to return. `0` means [`DEFAULT_PAGE_SIZE`].
    pub size: usize,
}

impl FindAllPage {
    /// The page starting at `cursor`, with the default size.
    #[must_use]
    pub const fn from_cursor(cursor: u64) -> Self {
        Self {
            cursor,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for FindAllPage {
    fn default() -> Self {
        Self::from_cursor(0)
    }
}

/// One page of orders.
///
/// The index is unordered and pages are not a snapshot: an order inserted or
/// deleted while a scan is in progress may show up once, or not at all.
/// Orders left untouched for the whole scan are returned exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindResult {
    /// Orders on this page, in index order.
    pub orders: Vec<Order>,

    /// Cursor for the next page. `0` means the scan is complete.
    pub cursor: u64,
}

impl FindResult {
    /// Whether this is the last page.
    ///
    /// A page with no orders is always the last page, and a returned cursor of
    /// `0` only ever means completion, so either signal can be trusted.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor == 0 || self.orders.is_empty()
    }
}

/// An [`OrderStore`] over any [`Backend`].
pub struct OrderRepository<B> {
    backend: B,
}

impl<B: Backend> OrderRepository<B> {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn encode(order: &Order) -> Result<Vec<u8>> {
        serde_json::to_vec(order).map_err(|e| StoreError::Encoding(e.to_string()))
    }

    fn decode(key: &str, data: &[u8]) -> Result<Order> {
        serde_json::from_slice(data).map_err(|e| StoreError::Decoding {
            key: key.to_owned(),
            message: e.to_string(),
        })
    }
}

impl<B: Backend> OrderStore for OrderRepository<B> {
    #[tracing::instrument(level = "debug", skip_all, fields(order_id = %order.order_id))]
    fn insert(&self, order: &Order, deadline: &Deadline) -> Result<()> {
        let data = Self::encode(order)?;
        let key = keys::order_key(order.order_id);
        deadline.check()?;

        let mut txn = self.backend.begin()?;
        if txn.get_for_update(&key)?.is_some() {
            return Err(StoreError::DuplicateKey { key });
        }
        txn.put(&key, &data)?;
        txn.set_add(ORDER_INDEX, &key)?;

        deadline.check()?;
        txn.commit()
    }

    #[tracing::instrument(level = "debug", skip(self, deadline))]
    fn find_by_id(&self, order_id: OrderId, deadline: &Deadline) -> Result<Order> {
        deadline.check()?;
        let key = keys::order_key(order_id);

        match self.backend.get(&key)? {
            Some(data) => Self::decode(&key, &data),
            None => Err(StoreError::NotFound { key }),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, deadline))]
    fn find_all(&self, page: FindAllPage, deadline: &Deadline) -> Result<FindResult> {
        let size = if page.size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page.size
        };
        let mut start = keys::cursor_start(page.cursor);

        // A scan step can come back empty while members remain (every key in
        // it was deleted before the fetch), so keep stepping until there is
        // something to return or the index is exhausted.
        loop {
            deadline.check()?;
            let scan =
                self.backend
                    .scan_set(ORDER_INDEX, start.as_deref(), ORDER_KEY_PATTERN, size)?;

            let cursor = match &scan.resume_from {
                Some(member) => keys::cursor_for(member).ok_or_else(|| StoreError::Decoding {
                    key: member.clone(),
                    message: "index member is not an order key".into(),
                })?,
                None => 0,
            };

            let mut orders = Vec::new();
            if !scan.members.is_empty() {
                let values = self.backend.multi_get(&scan.members)?;
                for (key, value) in scan.members.iter().zip(values) {
                    match value {
                        Some(data) => orders.push(Self::decode(key, &data)?),
                        None => tracing::debug!(%key, "Indexed order has no record, skipping"),
                    }
                }
            }

            if !orders.is_empty() || scan.resume_from.is_none() {
                return Ok(FindResult { orders, cursor });
            }
            start = scan.resume_from;
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(order_id = %order.order_id))]
    fn update(&self, order: &Order, deadline: &Deadline) -> Result<()> {
        let data = Self::encode(order)?;
        let key = keys::order_key(order.order_id);
        deadline.check()?;

        let mut txn = self.backend.begin()?;
        if txn.get_for_update(&key)?.is_none() {
            return Err(StoreError::NotExist { key });
        }
        txn.put(&key, &data)?;

        deadline.check()?;
        txn.commit()
    }

    #[tracing::instrument(level = "debug", skip(self, deadline))]
    fn delete_by_id(&self, order_id: OrderId, deadline: &Deadline) -> Result<()> {
        let key = keys::order_key(order_id);
        deadline.check()?;

        let mut txn = self.backend.begin()?;
        if txn.get_for_update(&key)?.is_none() {
            return Err(StoreError::NotExist { key });
        }
        txn.delete(&key)?;
        txn.set_remove(ORDER_INDEX, &key)?;

        deadline.check()?;
        txn.commit()
    }
}
