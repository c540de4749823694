//! In-memory backend.
//!
//! Intended for tests and local development; nothing is persisted across
//! restarts. A transaction holds the backend's lock for its whole lifetime,
//! so transactions are fully serialized and commits are trivially atomic.
//!
//! [`MemoryBackend::fail_next_commits`] makes upcoming commits fail after all
//! writes have been staged, which is how tests exercise the failure path of
//! multi-step mutations.

use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::backend::{collect_scan, Backend, SetScan, Transaction};
use crate::error::{Result, StoreError};

#[derive(Debug, Default)]
struct MemState {
    keys: HashMap<String, Vec<u8>>,
    sets: HashMap<String, BTreeSet<String>>,
}

/// In-memory [`Backend`] backed by a `HashMap` and ordered sets.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemState>,
    pending_commit_failures: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` commits fail with `StoreError::Backend`.
    pub fn fail_next_commits(&self, n: usize) {
        self.pending_commit_failures.store(n, Ordering::SeqCst);
    }

    /// All keys in the primary key space, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the lock is poisoned.
    pub fn keys(&self) -> Result<Vec<String>> {
        let state = self.lock()?;
        let mut keys: Vec<String> = state.keys.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// All members of the named set, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the lock is poisoned.
    pub fn members(&self, set: &str) -> Result<Vec<String>> {
        let state = self.lock()?;
        Ok(state
            .sets
            .get(set)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory backend lock poisoned".into()))
    }

    /// Consume one injected failure, if any are pending.
    fn take_commit_failure(&self) -> bool {
        self.pending_commit_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[derive(Debug)]
enum Write {
    Put(String, Vec<u8>),
    Delete(String),
    SetAdd(String, String),
    SetRemove(String, String),
}

/// An open [`MemoryBackend`] transaction.
pub struct MemTransaction<'a> {
    backend: &'a MemoryBackend,
    state: MutexGuard<'a, MemState>,
    writes: Vec<Write>,
}

impl Transaction for MemTransaction<'_> {
    fn get_for_update(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let staged = self.writes.iter().rev().find_map(|w| match w {
            Write::Put(k, v) if k == key => Some(Some(v.clone())),
            Write::Delete(k) if k == key => Some(None),
            _ => None,
        });

        Ok(staged.unwrap_or_else(|| self.state.keys.get(key).cloned()))
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.writes.push(Write::Put(key.to_owned(), value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.writes.push(Write::Delete(key.to_owned()));
        Ok(())
    }

    fn set_add(&mut self, set: &str, member: &str) -> Result<()> {
        self.writes
            .push(Write::SetAdd(set.to_owned(), member.to_owned()));
        Ok(())
    }

    fn set_remove(&mut self, set: &str, member: &str) -> Result<()> {
        self.writes
            .push(Write::SetRemove(set.to_owned(), member.to_owned()));
        Ok(())
    }

    fn commit(mut self) -> Result<()> {
        if self.backend.take_commit_failure() {
            return Err(StoreError::Backend("injected commit failure".into()));
        }

        let writes = std::mem::take(&mut self.writes);
        let state = &mut *self.state;
        for write in writes {
            match write {
                Write::Put(key, value) => {
                    state.keys.insert(key, value);
                }
                Write::Delete(key) => {
                    state.keys.remove(&key);
                }
                Write::SetAdd(set, member) => {
                    state.sets.entry(set).or_default().insert(member);
                }
                Write::SetRemove(set, member) => {
                    if let Some(members) = state.sets.get_mut(&set) {
                        members.remove(&member);
                    }
                }
            }
        }

        Ok(())
    }
}

impl Backend for MemoryBackend {
    type Transaction<'a> = MemTransaction<'a>;

    fn begin(&self) -> Result<MemTransaction<'_>> {
        Ok(MemTransaction {
            backend: self,
            state: self.lock()?,
            writes: Vec::new(),
        })
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.keys.get(key).cloned())
    }

    fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let state = self.lock()?;
        Ok(keys.iter().map(|k| state.keys.get(k).cloned()).collect())
    }

    fn scan_set(
        &self,
        set: &str,
        start: Option<&str>,
        pattern: &str,
        count: usize,
    ) -> Result<SetScan> {
        let state = self.lock()?;
        let Some(members) = state.sets.get(set) else {
            return Ok(SetScan::default());
        };

        let lower = start.map_or(Bound::Unbounded, Bound::Included);
        let iter = members
            .range::<str, _>((lower, Bound::Unbounded))
            .map(|m| Ok(m.clone()));

        collect_scan(iter, pattern, count)
    }
}
