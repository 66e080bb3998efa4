use std::ops::ControlFlow;

use crate::batch::WriteBatch;
use crate::error::StoreResult;

/// An ordered byte-keyed store: the unit behind every bucket.
///
/// All implementations must satisfy these invariants:
/// - Keys are iterated in ascending lexicographic byte order.
/// - [`write`](Self::write) applies every operation of a batch or none.
/// - Reads never observe a partially applied batch.
/// - All engine errors are propagated, never silently ignored.
pub trait OrderedStore: Send + Sync {
    /// Read the value stored under `key`. `Ok(None)` if absent.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Delete `key`. Returns `true` if it existed.
    fn delete(&self, key: &[u8]) -> StoreResult<bool>;

    /// Commit a batch atomically.
    fn write(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Visit entries from the first key `>= start` up to and including `end`
    /// (unbounded when `end` is `None`), in ascending order.
    ///
    /// The visitor returns [`ControlFlow::Break`] to stop early.
    fn scan(
        &self,
        start: &[u8],
        end: Option<&[u8]>,
        visit: &mut dyn FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    ) -> StoreResult<()>;

    /// Collect keys in `[start, end]`.
    fn scan_keys(&self, start: &[u8], end: Option<&[u8]>) -> StoreResult<Vec<Vec<u8>>> {
        let mut keys = Vec::new();
        self.scan(start, end, &mut |k, _| {
            keys.push(k.to_vec());
            ControlFlow::Continue(())
        })?;
        Ok(keys)
    }

    /// Collect entries in `[start, end]`.
    fn scan_entries(
        &self,
        start: &[u8],
        end: Option<&[u8]>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries = Vec::new();
        self.scan(start, end, &mut |k, v| {
            entries.push((k.to_vec(), v.to_vec()));
            ControlFlow::Continue(())
        })?;
        Ok(entries)
    }

    /// Returns `true` if the store holds no entries.
    fn is_empty(&self) -> StoreResult<bool> {
        let mut empty = true;
        self.scan(&[], None, &mut |_, _| {
            empty = false;
            ControlFlow::Break(())
        })?;
        Ok(empty)
    }
}
