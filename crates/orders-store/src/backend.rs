//! The key-value contract the order store is built on.
//!
//! A backend offers a string-keyed primary key space, named unordered sets,
//! bulk reads, cursor-style set iteration, and transactions. Everything the
//! repository needs (set-if-absent, set-if-present, paired record/index
//! mutations) is composed from these primitives inside a [`Transaction`].

use crate::error::Result;

/// A key-value store with named sets and transactions.
pub trait Backend: Send + Sync {
    /// An open transaction. Dropping it without calling
    /// [`Transaction::commit`] discards every staged write.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Start a transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the transaction cannot be opened.
    fn begin(&self) -> Result<Self::Transaction<'_>>;

    /// Read a single key outside any transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the read fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Read many keys at once. The result has one slot per requested key, in
    /// the same order, with `None` for keys that have no value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the read fails.
    fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Iterate part of a named set.
    ///
    /// Visits at most `count` members starting at `start` (or the beginning of
    /// the set), returning those that match the glob `pattern`. Like a Redis
    /// `SSCAN`, filtering happens after counting, so a page may hold fewer
    /// than `count` members even when more remain.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the set cannot be read.
    fn scan_set(
        &self,
        set: &str,
        start: Option<&str>,
        pattern: &str,
        count: usize,
    ) -> Result<SetScan>;
}

/// Staged writes against a [`Backend`], applied all-or-nothing on commit.
pub trait Transaction {
    /// Read a key and lock it against concurrent writers until the
    /// transaction ends. Sees writes staged earlier in this transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the read or lock fails.
    fn get_for_update(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stage a write of `value` to `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the write cannot be staged.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Stage removal of `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the delete cannot be staged.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Stage adding `member` to the named set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the set is unknown or the write fails.
    fn set_add(&mut self, set: &str, member: &str) -> Result<()>;

    /// Stage removing `member` from the named set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the set is unknown or the write fails.
    fn set_remove(&mut self, set: &str, member: &str) -> Result<()>;

    /// Apply every staged write atomically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the commit fails, in which case none
    /// of the staged writes are visible.
    fn commit(self) -> Result<()>;
}

/// One step of a set iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetScan {
    /// Members visited in this step that matched the pattern.
    pub members: Vec<String>,

    /// The member the next step starts at, or `None` if the set is exhausted.
    pub resume_from: Option<String>,
}

/// Build a [`SetScan`] from an ordered stream of set members.
///
/// Shared by the backends so that counting, filtering and the resume point
/// behave identically everywhere.
pub(crate) fn collect_scan<I>(members: I, pattern: &str, count: usize) -> Result<SetScan>
where
    I: IntoIterator<Item = Result<String>>,
{
    let mut scan = SetScan::default();
    let mut visited = 0;

    for member in members {
        let member = member?;
        if visited == count {
            scan.resume_from = Some(member);
            break;
        }
        visited += 1;
        if glob_match(pattern, &member) {
            scan.members.push(member);
        }
    }

    Ok(scan)
}

/// Match `text` against a glob supporting `*` (any run) and `?` (any one char).
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                // Let the last `*` swallow one more char and retry.
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<Result<String>> {
        names.iter().map(|n| Ok((*n).to_string())).collect()
    }

    #[test]
    fn glob_star_and_question() {
        assert!(glob_match("*", ""));
        assert!(glob_match("order:*", "order:42"));
        assert!(glob_match("order:*", "order:"));
        assert!(!glob_match("order:*", "orders"));
        assert!(glob_match("order:?", "order:7"));
        assert!(!glob_match("order:?", "order:77"));
        assert!(glob_match("*:*2", "order:42"));
        assert!(!glob_match("*:*3", "order:42"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
    }

    #[test]
    fn collect_scan_stops_at_count() {
        let scan = collect_scan(members(&["a", "b", "c"]), "*", 2).unwrap();
        assert_eq!(scan.members, vec!["a", "b"]);
        assert_eq!(scan.resume_from.as_deref(), Some("c"));
    }

    #[test]
    fn collect_scan_exhausts() {
        let scan = collect_scan(members(&["a", "b"]), "*", 2).unwrap();
        assert_eq!(scan.members, vec!["a", "b"]);
        assert_eq!(scan.resume_from, None);
    }

    #[test]
    fn collect_scan_filters_after_counting() {
        let scan = collect_scan(members(&["order:1", "other", "order:2"]), "order:*", 2).unwrap();
        assert_eq!(scan.members, vec!["order:1"]);
        assert_eq!(scan.resume_from.as_deref(), Some("order:2"));
    }
}
