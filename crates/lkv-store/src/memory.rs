use std::collections::BTreeMap;
use std::ops::{Bound, ControlFlow};
use std::sync::RwLock;

use crate::batch::{BatchOp, WriteBatch};
use crate::error::StoreResult;
use crate::traits::OrderedStore;

/// In-memory, `BTreeMap`-based ordered store.
///
/// Intended for tests and embedding. Entries live behind a `RwLock`; a batch
/// is applied under a single write lock, which makes it atomic to readers.
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedStore for InMemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }

    fn write(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => {
                    map.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn scan(
        &self,
        start: &[u8],
        end: Option<&[u8]>,
        visit: &mut dyn FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    ) -> StoreResult<()> {
        if matches!(end, Some(end) if end < start) {
            return Ok(());
        }
        let map = self.entries.read().expect("lock poisoned");
        let upper = match end {
            Some(end) => Bound::Included(end),
            None => Bound::Unbounded,
        };
        for (k, v) in map.range::<[u8], _>((Bound::Included(start), upper)) {
            if visit(k, v).is_break() {
                break;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(keys: &[&str]) -> InMemoryStore {
        let store = InMemoryStore::new();
        for k in keys {
            store.put(k.as_bytes(), b"v").unwrap();
        }
        store
    }

    #[test]
    fn put_get_delete() {
        let store = InMemoryStore::new();
        store.put(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert!(store.delete(b"k").unwrap());
        assert!(!store.delete(b"k").unwrap());
        assert!(store.get(b"k").unwrap().is_none());
    }

    #[test]
    fn scan_respects_inclusive_bounds() {
        let store = store_with(&["a", "b", "c", "d"]);
        assert_eq!(
            store.scan_keys(b"b", None).unwrap(),
            vec![b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]
        );
        assert_eq!(
            store.scan_keys(b"b", Some(b"c".as_slice())).unwrap(),
            vec![b"b".to_vec(), b"c".to_vec()]
        );
        assert!(store.scan_keys(b"d", Some(b"a".as_slice())).unwrap().is_empty());
    }

    #[test]
    fn batch_applies_in_order() {
        let store = store_with(&["gone"]);
        let mut batch = WriteBatch::new();
        batch.put(b"x", b"1").delete(b"gone").put(b"x", b"2");
        store.write(batch).unwrap();

        assert_eq!(store.get(b"x").unwrap(), Some(b"2".to_vec()));
        assert!(store.get(b"gone").unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn is_empty_and_clear() {
        let store = store_with(&["a"]);
        assert!(!store.is_empty().unwrap());
        store.clear();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", store_with(&["a"]));
        assert!(debug.contains("InMemoryStore"));
        assert!(debug.contains("entry_count"));
    }
}
