//! Order storage engine.
//!
//! This crate persists orders in a key-value store and keeps a secondary index
//! of every live order so that orders can be listed page by page.
//!
//! # Layout
//!
//! - `order:<id>`: the JSON-encoded [`Order`], one key per order
//! - `orders`: an unordered set holding every live `order:<id>` key
//!
//! Insert and delete change both halves in a single backend transaction;
//! a key is a member of `orders` exactly when its record exists.
//!
//! # Backends
//!
//! - `RocksBackend`: `RocksDB` `TransactionDB` (feature `rocksdb-backend`)
//! - [`MemoryBackend`]: in-memory, for tests and local runs
//!
//! # Example
//!
//! ```
//! use orders_core::{CustomerId, Order};
//! use orders_store::{Deadline, FindAllPage, MemoryStore, OrderStore};
//!
//! let store = MemoryStore::in_memory();
//!
//! let order = Order::new(CustomerId::generate(), vec![]);
//! store.insert(&order, &Deadline::none()).unwrap();
//!
//! let page = store.find_all(FindAllPage::default(), &Deadline::none()).unwrap();
//! assert!(!page.orders.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod deadline;
pub mod error;
pub mod keys;
pub mod mem;
pub mod repository;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use backend::{Backend, SetScan, Transaction};
pub use deadline::Deadline;
pub use error::{Result, StoreError};
pub use mem::MemoryBackend;
pub use repository::{FindAllPage, FindResult, OrderRepository, DEFAULT_PAGE_SIZE};
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksBackend;

use orders_core::{Order, OrderId};

/// An order store backed by `RocksDB`.
#[cfg(feature = "rocksdb-backend")]
pub type RocksStore = OrderRepository<RocksBackend>;

/// An order store held entirely in memory.
pub type MemoryStore = OrderRepository<MemoryBackend>;

#[cfg(feature = "rocksdb-backend")]
impl RocksStore {
    /// Open or create a `RocksDB`-backed store at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        RocksBackend::open(path).map(OrderRepository::new)
    }
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        OrderRepository::new(MemoryBackend::new())
    }
}

/// The order storage operations.
///
/// Every operation takes the caller's [`Deadline`]; once it has passed the
/// operation fails with `StoreError::Timeout` and nothing is written. Errors
/// are returned as-is and never retried.
pub trait OrderStore: Send + Sync {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a new order and add it to the index.
    ///
    /// # Errors
    ///
    /// - `StoreError::Encoding` if the order cannot be serialized.
    /// - `StoreError::DuplicateKey` if an order with this ID already exists.
    /// - `StoreError::Backend` / `StoreError::Timeout` if the commit fails.
    fn insert(&self, order: &Order, deadline: &Deadline) -> Result<()>;

    /// Replace an existing order. The index is not touched.
    ///
    /// # Errors
    ///
    /// - `StoreError::Encoding` if the order cannot be serialized.
    /// - `StoreError::NotExist` if no order with this ID exists.
    /// - `StoreError::Backend` / `StoreError::Timeout` if the commit fails.
    fn update(&self, order: &Order, deadline: &Deadline) -> Result<()>;

    /// Delete an order and remove it from the index.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotExist` if no order with this ID exists.
    /// - `StoreError::Backend` / `StoreError::Timeout` if the commit fails.
    fn delete_by_id(&self, order_id: OrderId, deadline: &Deadline) -> Result<()>;

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no order with this ID exists.
    /// - `StoreError::Decoding` if the stored record is unreadable.
    fn find_by_id(&self, order_id: OrderId, deadline: &Deadline) -> Result<Order>;

    /// List one page of orders from the index.
    ///
    /// Index members whose record disappeared before it could be fetched are
    /// skipped.
    ///
    /// # Errors
    ///
    /// - `StoreError::Decoding` if any fetched record is unreadable.
    /// - `StoreError::Backend` / `StoreError::Timeout` if the scan fails.
    fn find_all(&self, page: FindAllPage, deadline: &Deadline) -> Result<FindResult>;
}
