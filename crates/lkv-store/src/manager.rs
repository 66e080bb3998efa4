use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::bucket::BucketStore;
use crate::error::StoreResult;
use crate::registry::BucketRegistry;
use crate::stream::KeyStream;
use crate::traits::OrderedStore;

/// Directory under the base location holding the per-bucket index stores.
pub const INDEX_NAMESPACE: &str = "_indexes";

/// Owns every bucket store of one service instance.
///
/// Data buckets live in `<base>/<bucket>/`; each has a posting store in
/// `<base>/_indexes/<bucket>/`. The manager is created once at startup and
/// passed by reference to every operation.
#[derive(Debug)]
pub struct BucketStoreManager {
    base: PathBuf,
    data: BucketRegistry,
    indexes: BucketRegistry,
}

impl BucketStoreManager {
    /// Open the manager at `base`, opening all existing data and index
    /// stores. An error here is fatal to startup.
    pub fn open(base: impl Into<PathBuf>) -> StoreResult<Self> {
        let base = base.into();
        let data = BucketRegistry::open(&base)?;
        let indexes = BucketRegistry::open(base.join(INDEX_NAMESPACE))?;
        info!(base = %base.display(), "bucket store manager ready");
        Ok(Self {
            base,
            data,
            indexes,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Data store for `bucket`, created on first use.
    pub fn open_or_create(&self, bucket: &str) -> StoreResult<Arc<BucketStore>> {
        self.data.open_or_create(bucket)
    }

    /// Data store for `bucket` if it exists.
    pub fn get_existing(&self, bucket: &str) -> Option<Arc<BucketStore>> {
        self.data.get_existing(bucket)
    }

    /// Posting store for `bucket`, created on first use.
    pub fn index_store(&self, bucket: &str) -> StoreResult<Arc<BucketStore>> {
        self.indexes.open_or_create(bucket)
    }

    /// Posting store for `bucket` if it exists.
    pub fn existing_index_store(&self, bucket: &str) -> Option<Arc<BucketStore>> {
        self.indexes.get_existing(bucket)
    }

    /// Destroy a bucket together with its posting store. No-op for unknown
    /// buckets; returns whether the data bucket existed.
    pub fn destroy(&self, bucket: &str) -> StoreResult<bool> {
        let existed = self.data.destroy(bucket)?;
        self.indexes.destroy(bucket)?;
        Ok(existed)
    }

    /// Names of all data buckets on disk, sorted. The index namespace and
    /// hidden entries are excluded.
    pub fn list_bucket_names(&self) -> StoreResult<Vec<String>> {
        self.data.list_names()
    }

    /// Every key of `bucket` in ascending order. Unknown buckets are empty.
    pub fn list_keys(&self, bucket: &str) -> StoreResult<Vec<String>> {
        self.key_range(bucket, "", "")
    }

    /// Keys from the first `>= start` through the last `<= end`; an empty
    /// `end` means no upper bound.
    pub fn key_range(&self, bucket: &str, start: &str, end: &str) -> StoreResult<Vec<String>> {
        let Some(store) = self.get_existing(bucket) else {
            return Ok(Vec::new());
        };
        let end = (!end.is_empty()).then_some(end.as_bytes());
        let keys = store
            .scan_keys(start.as_bytes(), end)?
            .into_iter()
            .map(|k| String::from_utf8_lossy(&k).into_owned())
            .collect();
        Ok(keys)
    }

    /// Stream the keys of `bucket` through a background producer.
    pub fn stream_keys(&self, bucket: &str) -> StoreResult<KeyStream> {
        match self.get_existing(bucket) {
            Some(store) => KeyStream::spawn(bucket, store),
            None => Ok(KeyStream::empty(bucket)),
        }
    }

    /// Returns `true` if `bucket` is unknown or holds no keys.
    pub fn is_bucket_empty(&self, bucket: &str) -> StoreResult<bool> {
        match self.get_existing(bucket) {
            Some(store) => store.is_empty(),
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(keys: &[&str]) -> (tempfile::TempDir, BucketStoreManager) {
        let tmp = tempfile::tempdir().unwrap();
        let manager = BucketStoreManager::open(tmp.path()).unwrap();
        let store = manager.open_or_create("letters").unwrap();
        for k in keys {
            store.put(k.as_bytes(), b"").unwrap();
        }
        (tmp, manager)
    }

    #[test]
    fn key_range_bounds() {
        let (_tmp, manager) = manager_with(&["a", "b", "c", "d"]);
        assert_eq!(manager.key_range("letters", "b", "").unwrap(), vec!["b", "c", "d"]);
        assert_eq!(manager.key_range("letters", "b", "c").unwrap(), vec!["b", "c"]);
        assert_eq!(manager.list_keys("letters").unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn unknown_bucket_is_empty() {
        let (_tmp, manager) = manager_with(&[]);
        assert!(manager.list_keys("nope").unwrap().is_empty());
        assert!(manager.key_range("nope", "a", "z").unwrap().is_empty());
        assert!(manager.is_bucket_empty("nope").unwrap());
        assert!(manager.is_bucket_empty("letters").unwrap());
        assert!(manager.get_existing("nope").is_none());
    }

    #[test]
    fn index_namespace_is_hidden() {
        let (tmp, manager) = manager_with(&["a"]);
        manager.index_store("letters").unwrap();
        assert!(tmp.path().join(INDEX_NAMESPACE).join("letters").is_dir());
        assert_eq!(manager.list_bucket_names().unwrap(), vec!["letters"]);
        assert!(manager.existing_index_store("letters").is_some());
    }

    #[test]
    fn destroy_removes_data_and_index_stores() {
        let (tmp, manager) = manager_with(&["a"]);
        manager.index_store("letters").unwrap();
        assert!(manager.destroy("letters").unwrap());
        assert!(!tmp.path().join("letters").exists());
        assert!(!tmp.path().join(INDEX_NAMESPACE).join("letters").exists());
        assert!(manager.list_bucket_names().unwrap().is_empty());
        assert!(!manager.destroy("letters").unwrap());
    }

    #[test]
    fn stream_keys_matches_list_keys() {
        let (_tmp, manager) = manager_with(&["x", "y", "z"]);
        let streamed: Vec<String> = manager
            .stream_keys("letters")
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(streamed, manager.list_keys("letters").unwrap());
        assert_eq!(manager.stream_keys("nope").unwrap().count(), 0);
    }

    #[test]
    fn reopen_restores_index_stores() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let manager = BucketStoreManager::open(tmp.path()).unwrap();
            manager.open_or_create("b").unwrap();
            manager.index_store("b").unwrap().put(b"f~v", b"k").unwrap();
        }
        let manager = BucketStoreManager::open(tmp.path()).unwrap();
        let index = manager.existing_index_store("b").expect("index store reopened");
        assert_eq!(index.get(b"f~v").unwrap(), Some(b"k".to_vec()));
    }
}
