use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::bucket::BucketStore;
use crate::error::{StoreError, StoreResult};

/// Returns `true` if `name` may be used as a bucket directory name.
///
/// Names starting with `.` or `_` are hidden or reserved, and names that
/// would escape the base directory are rejected.
pub fn is_valid_bucket_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.starts_with('_')
        && !name.contains(['/', '\\', '\0'])
}

/// Directory-backed registry of open bucket stores.
///
/// Each bucket lives in `<base>/<name>/`. Handles are opened lazily and
/// cached until the bucket is destroyed or the registry is dropped.
pub struct BucketRegistry {
    base: PathBuf,
    handles: RwLock<HashMap<String, Arc<BucketStore>>>,
}

impl BucketRegistry {
    /// Open a registry rooted at `base`, creating the directory if needed and
    /// opening every bucket already present on disk.
    ///
    /// Any failure here means the base location is unusable; callers treat it
    /// as fatal.
    pub fn open(base: impl Into<PathBuf>) -> StoreResult<Self> {
        let base = base.into();
        fs::create_dir_all(&base)?;

        let mut handles = HashMap::new();
        for name in scan_bucket_dirs(&base)? {
            let store = BucketStore::open(&name, &base.join(&name))?;
            handles.insert(name, Arc::new(store));
        }
        info!(base = %base.display(), buckets = handles.len(), "bucket registry opened");

        Ok(Self {
            base,
            handles: RwLock::new(handles),
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Return the cached handle for `name`, creating the store if missing.
    pub fn open_or_create(&self, name: &str) -> StoreResult<Arc<BucketStore>> {
        if let Some(store) = self.get_existing(name) {
            return Ok(store);
        }
        if !is_valid_bucket_name(name) {
            return Err(StoreError::InvalidBucketName(name.to_string()));
        }

        let mut handles = self.handles.write().expect("lock poisoned");
        // Another caller may have opened it while we waited for the lock.
        if let Some(store) = handles.get(name) {
            return Ok(Arc::clone(store));
        }
        let store = Arc::new(BucketStore::open(name, &self.base.join(name))?);
        handles.insert(name.to_string(), Arc::clone(&store));
        debug!(bucket = name, "created bucket");
        Ok(store)
    }

    /// Return the cached handle for `name` without creating anything.
    pub fn get_existing(&self, name: &str) -> Option<Arc<BucketStore>> {
        self.handles
            .read()
            .expect("lock poisoned")
            .get(name)
            .map(Arc::clone)
    }

    /// Evict `name` and remove its directory. Returns `false` if the bucket
    /// was not known.
    pub fn destroy(&self, name: &str) -> StoreResult<bool> {
        let removed = self.handles.write().expect("lock poisoned").remove(name);
        let Some(store) = removed else {
            return Ok(false);
        };
        let dir = store.dir().to_path_buf();
        drop(store);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        info!(bucket = name, "destroyed bucket");
        Ok(true)
    }

    /// Names of the bucket directories currently on disk, sorted.
    pub fn list_names(&self) -> StoreResult<Vec<String>> {
        scan_bucket_dirs(&self.base)
    }

    /// Number of cached handles.
    pub fn open_count(&self) -> usize {
        self.handles.read().expect("lock poisoned").len()
    }
}

impl std::fmt::Debug for BucketRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketRegistry")
            .field("base", &self.base)
            .field("open", &self.open_count())
            .finish()
    }
}

fn scan_bucket_dirs(base: &Path) -> StoreResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_valid_bucket_name(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::OrderedStore;

    #[test]
    fn bucket_name_rules() {
        assert!(is_valid_bucket_name("photos"));
        assert!(is_valid_bucket_name("my-bucket.v2"));
        assert!(!is_valid_bucket_name(""));
        assert!(!is_valid_bucket_name("_indexes"));
        assert!(!is_valid_bucket_name(".hidden"));
        assert!(!is_valid_bucket_name("a/b"));
        assert!(!is_valid_bucket_name(".."));
    }

    #[test]
    fn open_or_create_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = BucketRegistry::open(tmp.path()).unwrap();
        let a = registry.open_or_create("b").unwrap();
        let b = registry.open_or_create("b").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.open_count(), 1);
        assert!(tmp.path().join("b").is_dir());
    }

    #[test]
    fn get_existing_never_creates() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = BucketRegistry::open(tmp.path()).unwrap();
        assert!(registry.get_existing("nope").is_none());
        assert!(!tmp.path().join("nope").exists());
    }

    #[test]
    fn reserved_names_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = BucketRegistry::open(tmp.path()).unwrap();
        let err = registry.open_or_create("_indexes").unwrap_err();
        assert!(matches!(err, StoreError::InvalidBucketName(_)));
    }

    #[test]
    fn reopen_enumerates_existing_buckets() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let registry = BucketRegistry::open(tmp.path()).unwrap();
            registry.open_or_create("one").unwrap().put(b"k", b"v").unwrap();
            registry.open_or_create("two").unwrap();
        }
        fs::create_dir_all(tmp.path().join("_indexes")).unwrap();
        fs::create_dir_all(tmp.path().join(".trash")).unwrap();
        fs::write(tmp.path().join("stray-file"), b"x").unwrap();

        let registry = BucketRegistry::open(tmp.path()).unwrap();
        assert_eq!(registry.open_count(), 2);
        assert_eq!(registry.list_names().unwrap(), vec!["one", "two"]);
        let one = registry.get_existing("one").expect("reopened at startup");
        assert_eq!(one.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn destroy_removes_state() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = BucketRegistry::open(tmp.path()).unwrap();
        registry.open_or_create("gone").unwrap();
        assert!(registry.destroy("gone").unwrap());
        assert!(registry.get_existing("gone").is_none());
        assert!(!tmp.path().join("gone").exists());
        assert!(!registry.destroy("gone").unwrap());
    }

    #[test]
    fn open_fails_on_unreadable_base() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();
        assert!(BucketRegistry::open(&file).is_err());
    }
}
