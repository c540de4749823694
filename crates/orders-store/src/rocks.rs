//! `RocksDB` backend.
//!
//! The primary key space lives in the `primary` column family and each named
//! set in a column family of its own. Mutations go through pessimistic
//! `TransactionDB` transactions: `get_for_update` takes a lock on the key, so
//! concurrent inserts of the same order (or an update racing a delete) are
//! serialized by `RocksDB` itself.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, MultiThreaded, Options,
    TransactionDB, TransactionDBOptions,
};

use crate::backend::{collect_scan, Backend, SetScan, Transaction};
use crate::error::{Result, StoreError};
use crate::schema::{all_column_families, cf, is_set};

fn backend_err(e: &rocksdb::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// RocksDB-backed [`Backend`].
pub struct RocksBackend {
    db: TransactionDB<MultiThreaded>,
}

impl RocksBackend {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            cf_descriptors,
        )
        .map_err(|e| backend_err(&e))?;

        Ok(Self { db })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Backend(format!("column family not found: {name}")))
    }

    /// Get the column family holding a named set.
    fn set_cf(&self, set: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        if !is_set(set) {
            return Err(StoreError::Backend(format!("unknown set: {set}")));
        }
        self.cf(set)
    }
}

/// An open [`RocksBackend`] transaction.
pub struct RocksTransaction<'a> {
    backend: &'a RocksBackend,
    txn: rocksdb::Transaction<'a, TransactionDB<MultiThreaded>>,
}

impl Transaction for RocksTransaction<'_> {
    fn get_for_update(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.backend.cf(cf::PRIMARY)?;
        self.txn
            .get_for_update_cf(&cf, key, true)
            .map_err(|e| backend_err(&e))
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self.backend.cf(cf::PRIMARY)?;
        self.txn.put_cf(&cf, key, value).map_err(|e| backend_err(&e))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let cf = self.backend.cf(cf::PRIMARY)?;
        self.txn.delete_cf(&cf, key).map_err(|e| backend_err(&e))
    }

    fn set_add(&mut self, set: &str, member: &str) -> Result<()> {
        let cf = self.backend.set_cf(set)?;
        // Index entry (empty value)
        self.txn.put_cf(&cf, member, []).map_err(|e| backend_err(&e))
    }

    fn set_remove(&mut self, set: &str, member: &str) -> Result<()> {
        let cf = self.backend.set_cf(set)?;
        self.txn.delete_cf(&cf, member).map_err(|e| backend_err(&e))
    }

    fn commit(self) -> Result<()> {
        self.txn.commit().map_err(|e| backend_err(&e))
    }
}

impl Backend for RocksBackend {
    type Transaction<'a> = RocksTransaction<'a>;

    fn begin(&self) -> Result<RocksTransaction<'_>> {
        Ok(RocksTransaction {
            backend: self,
            txn: self.db.transaction(),
        })
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf::PRIMARY)?;
        self.db.get_cf(&cf, key).map_err(|e| backend_err(&e))
    }

    fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let cf = self.cf(cf::PRIMARY)?;
        self.db
            .multi_get_cf(keys.iter().map(|k| (&cf, k.as_bytes())))
            .into_iter()
            .map(|r| r.map_err(|e| backend_err(&e)))
            .collect()
    }

    fn scan_set(
        &self,
        set: &str,
        start: Option<&str>,
        pattern: &str,
        count: usize,
    ) -> Result<SetScan> {
        let cf = self.set_cf(set)?;
        let mode = match start {
            Some(member) => IteratorMode::From(member.as_bytes(), Direction::Forward),
            None => IteratorMode::Start,
        };

        let members = self.db.iterator_cf(&cf, mode).map(|item| {
            let (key, _) = item.map_err(|e| backend_err(&e))?;
            String::from_utf8(key.into_vec())
                .map_err(|e| StoreError::Backend(format!("non-UTF-8 set member: {e}")))
        });

        collect_scan(members, pattern, count)
    }
}
