use std::path::PathBuf;

use lkv_index::{diff, IndexDiff, IndexQuery};
use lkv_store::{codec, BucketStoreManager, KeyStream, OrderedStore};
use lkv_types::{IndexPair, Metadata, ObjectKey};
use lkv_walk::{parse_phases, ObjectSource, WalkError, WalkResponse, WalkResult};
use tracing::{debug, error, info, warn};

use crate::error::DbResult;
use crate::object::{Object, StoreReceipt};

/// A LevelKV database rooted at one base directory.
///
/// Every object write keeps the bucket's postings in step with the object's
/// index declarations. The object is written first and the posting batch
/// second; if the batch fails the object stays written and the postings are
/// stale until the next write of that key.
#[derive(Debug)]
pub struct Database {
    stores: BucketStoreManager,
}

impl Database {
    /// Open the database, opening every bucket already on disk.
    pub fn open(base: impl Into<PathBuf>) -> DbResult<Self> {
        let stores = BucketStoreManager::open(base)?;
        info!(base = %stores.base().display(), "database opened");
        Ok(Self { stores })
    }

    pub fn stores(&self) -> &BucketStoreManager {
        &self.stores
    }

    // ---- Object operations ----

    /// Fetch and decode `(bucket, key)`.
    pub fn fetch_object(&self, bucket: &str, key: &str) -> DbResult<Option<Object>> {
        let Some(store) = self.stores.get_existing(bucket) else {
            return Ok(None);
        };
        let Some(blob) = store.get(key.as_bytes())? else {
            return Ok(None);
        };
        let (meta, payload) = codec::decode(&blob)?;
        Ok(Some(Object::new(meta, payload)))
    }

    /// Store an object, generating a key when `key` is `None`, and update the
    /// bucket's postings.
    pub fn store_object(
        &self,
        bucket: &str,
        key: Option<&str>,
        meta: Metadata,
        payload: &[u8],
    ) -> DbResult<StoreReceipt> {
        let (key, generated) = match key {
            Some(k) => (k.to_string(), false),
            None => (ObjectKey::generate(), true),
        };
        let store = self.stores.open_or_create(bucket)?;

        let previous = match store.get(key.as_bytes())? {
            Some(blob) => Some(codec::decode(&blob)?.0),
            None => None,
        };
        let old_indexes = previous
            .as_ref()
            .map(|m| m.indexes.as_slice())
            .unwrap_or_default();
        let changes = diff(&meta.indexes, old_indexes);

        let blob = codec::encode(&meta, payload)?;
        store.put(key.as_bytes(), &blob)?;
        debug!(bucket, key = %key, bytes = blob.len(), "stored object");

        if let Err(err) = self.update_postings(bucket, &key, &changes) {
            error!(
                bucket,
                key = %key,
                error = %err,
                "index update failed; postings are stale"
            );
            return Err(err);
        }

        Ok(StoreReceipt {
            key,
            generated,
            replaced: previous.is_some(),
        })
    }

    /// Delete `(bucket, key)` and drop it from the bucket's postings.
    /// Returns `false` if the object did not exist.
    pub fn delete_object(&self, bucket: &str, key: &str) -> DbResult<bool> {
        let Some(store) = self.stores.get_existing(bucket) else {
            return Ok(false);
        };
        let Some(blob) = store.get(key.as_bytes())? else {
            return Ok(false);
        };
        store.delete(key.as_bytes())?;
        debug!(bucket, key, "deleted object");

        let meta = match codec::decode(&blob) {
            Ok((meta, _)) => meta,
            Err(err) => {
                warn!(bucket, key, error = %err, "deleted undecodable object; postings left as is");
                return Ok(true);
            }
        };
        let no_indexes: &[IndexPair] = &[];
        let changes = diff(no_indexes, &meta.indexes);
        if !changes.is_empty() {
            if let Some(postings) = self.stores.existing_index_store(bucket) {
                lkv_index::apply(&changes, key, &*postings)?;
            }
        }
        Ok(true)
    }

    /// Open the bucket's posting store, even with nothing to apply, and apply
    /// `changes` to it.
    fn update_postings(&self, bucket: &str, key: &str, changes: &IndexDiff) -> DbResult<()> {
        let postings = self.stores.index_store(bucket)?;
        if !changes.is_empty() {
            lkv_index::apply(changes, key, &*postings)?;
        }
        Ok(())
    }

    // ---- Queries ----

    /// Run a secondary-index query. `None` when a posting lookup targets a
    /// bucket that was never written.
    pub fn query_index(
        &self,
        bucket: &str,
        query: &IndexQuery,
    ) -> DbResult<Option<Vec<String>>> {
        Ok(lkv_index::query(&self.stores, bucket, query)?)
    }

    /// Walk links from `(bucket, key)`. Every phase is validated before the
    /// first fetch; `None` when the start object does not exist.
    pub fn walk<S: AsRef<str>>(
        &self,
        bucket: &str,
        key: &str,
        phases: &[S],
    ) -> DbResult<Option<WalkResponse>> {
        let phases = parse_phases(phases)?;
        Ok(lkv_walk::walk(self, bucket, key, &phases)?)
    }

    // ---- Buckets ----

    pub fn list_buckets(&self) -> DbResult<Vec<String>> {
        Ok(self.stores.list_bucket_names()?)
    }

    pub fn list_keys(&self, bucket: &str) -> DbResult<Vec<String>> {
        Ok(self.stores.list_keys(bucket)?)
    }

    pub fn stream_keys(&self, bucket: &str) -> DbResult<KeyStream> {
        Ok(self.stores.stream_keys(bucket)?)
    }

    /// Destroy a bucket and its postings. Returns `false` if it was unknown.
    pub fn destroy_bucket(&self, bucket: &str) -> DbResult<bool> {
        Ok(self.stores.destroy(bucket)?)
    }
}

impl ObjectSource for Database {
    fn fetch(&self, bucket: &str, key: &str) -> WalkResult<Option<(Metadata, Vec<u8>)>> {
        self.fetch_object(bucket, key)
            .map(|found| found.map(|o| (o.meta, o.payload)))
            .map_err(WalkError::from_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;

    fn open() -> (tempfile::TempDir, Database) {
        let tmp = tempfile::tempdir().unwrap();
        let db = Database::open(tmp.path()).unwrap();
        (tmp, db)
    }

    fn lookup(db: &Database, field: &str, value: &str) -> Vec<String> {
        db.query_index("b", &IndexQuery::from_request(field, value, None))
            .unwrap()
            .unwrap_or_default()
    }

    #[test]
    fn store_then_fetch() {
        let (_tmp, db) = open();
        let meta = Metadata::new()
            .with_content_type("text/plain")
            .with_meta("author", "ann");
        let receipt = db.store_object("b", Some("k"), meta.clone(), b"hello").unwrap();
        assert_eq!(receipt.key, "k");
        assert!(!receipt.generated);
        assert!(!receipt.replaced);

        let obj = db.fetch_object("b", "k").unwrap().unwrap();
        assert_eq!(obj.meta, meta);
        assert_eq!(obj.payload, b"hello");
        assert!(db.fetch_object("b", "missing").unwrap().is_none());
        assert!(db.fetch_object("nobucket", "k").unwrap().is_none());
    }

    #[test]
    fn generated_keys_are_reported() {
        let (_tmp, db) = open();
        let receipt = db.store_object("b", None, Metadata::new(), b"x").unwrap();
        assert!(receipt.generated);
        assert_eq!(receipt.key.len(), 32);
        assert!(db.fetch_object("b", &receipt.key).unwrap().is_some());
    }

    #[test]
    fn overwrite_moves_postings() {
        let (_tmp, db) = open();
        let red_blue = Metadata::new().with_index("color", "red,blue");
        db.store_object("b", Some("k1"), red_blue, b"").unwrap();
        assert_eq!(lookup(&db, "color", "red"), vec!["k1"]);

        let blue = Metadata::new().with_index("color", "blue");
        let receipt = db.store_object("b", Some("k1"), blue, b"").unwrap();
        assert!(receipt.replaced);
        assert!(lookup(&db, "color", "red").is_empty());
        assert_eq!(lookup(&db, "color", "blue"), vec!["k1"]);
    }

    #[test]
    fn delete_clears_postings() {
        let (_tmp, db) = open();
        db.store_object("b", Some("k1"), Metadata::new().with_index("tag", "x"), b"")
            .unwrap();
        db.store_object("b", Some("k2"), Metadata::new().with_index("tag", "x"), b"")
            .unwrap();
        assert!(db.delete_object("b", "k1").unwrap());
        assert!(!db.delete_object("b", "k1").unwrap());
        assert!(!db.delete_object("nobucket", "k1").unwrap());
        assert_eq!(lookup(&db, "tag", "x"), vec!["k2"]);
        assert!(db.fetch_object("b", "k1").unwrap().is_none());
    }

    #[test]
    fn index_lookup_depends_only_on_bucket_existence() {
        let (_tmp, db) = open();
        let q = IndexQuery::from_request("color", "red", None);
        assert!(db.query_index("b", &q).unwrap().is_none());

        db.store_object("b", Some("k"), Metadata::new(), b"").unwrap();
        assert_eq!(db.query_index("b", &q).unwrap(), Some(vec![]));

        db.store_object("c", Some("k"), Metadata::new().with_index("color", "red"), b"")
            .unwrap();
        db.delete_object("c", "k").unwrap();
        assert_eq!(db.query_index("c", &q).unwrap(), Some(vec![]));

        let q = IndexQuery::from_request("$bucket", "_", None);
        assert_eq!(db.query_index("b", &q).unwrap(), Some(vec!["k".to_string()]));
    }

    #[test]
    fn undecodable_object_can_still_be_deleted() {
        let (_tmp, db) = open();
        let store = db.stores().open_or_create("b").unwrap();
        store.put(b"bad", b"\0\0\0\xff{").unwrap();
        assert!(db.fetch_object("b", "bad").is_err());

        assert!(db.delete_object("b", "bad").unwrap());
        assert!(store.get(b"bad").unwrap().is_none());
        assert!(!db.delete_object("b", "bad").unwrap());
    }

    #[test]
    fn failed_index_update_keeps_the_object() {
        let (tmp, db) = open();
        std::fs::write(tmp.path().join("_indexes").join("b"), b"not a directory").unwrap();

        let meta = Metadata::new().with_index("color", "red");
        let err = db.store_object("b", Some("k"), meta.clone(), b"v").unwrap_err();
        assert!(matches!(err, DbError::Store(_)));

        let obj = db.fetch_object("b", "k").unwrap().unwrap();
        assert_eq!(obj.meta, meta);
        assert_eq!(obj.payload, b"v");
    }

    #[test]
    fn invalid_bucket_name_is_rejected() {
        let (_tmp, db) = open();
        let err = db.store_object("_indexes", Some("k"), Metadata::new(), b"").unwrap_err();
        assert!(err.is_bad_request());
        assert!(db.list_buckets().unwrap().is_empty());
    }

    #[test]
    fn walk_follows_stored_links() {
        let (_tmp, db) = open();
        db.store_object(
            "list",
            Some("1"),
            Metadata::new().with_links("</buckets/list/keys/2>; riaktag=\"next\""),
            b"one",
        )
        .unwrap();
        db.store_object("list", Some("2"), Metadata::new(), b"two").unwrap();

        let resp = db.walk("list", "1", &["_,next,_"]).unwrap().unwrap();
        let body = String::from_utf8(resp.body).unwrap();
        assert!(body.contains("Location: /buckets/list/keys/2"));
        assert!(body.contains("two"));

        assert!(db.walk("list", "missing", &["_,_,_"]).unwrap().is_none());
        let none: [&str; 0] = [];
        assert!(db.walk("list", "1", &none).unwrap_err().is_bad_request());
        assert!(matches!(
            db.walk("list", "1", &["_,_"]),
            Err(DbError::Walk(WalkError::BadRequest(_)))
        ));
    }

    #[test]
    fn buckets_listing_and_destroy() {
        let (_tmp, db) = open();
        db.store_object("b2", Some("k"), Metadata::new().with_index("f", "v"), b"").unwrap();
        db.store_object("b1", Some("k"), Metadata::new(), b"").unwrap();
        assert_eq!(db.list_buckets().unwrap(), vec!["b1", "b2"]);
        assert_eq!(db.list_keys("b2").unwrap(), vec!["k"]);
        assert_eq!(db.stream_keys("b2").unwrap().count(), 1);

        assert!(db.destroy_bucket("b2").unwrap());
        assert_eq!(db.list_buckets().unwrap(), vec!["b1"]);
        assert!(db.list_keys("b2").unwrap().is_empty());
        assert!(!db.destroy_bucket("b2").unwrap());
    }
}
