use lkv_store::{BucketStoreManager, OrderedStore};
use tracing::debug;

use crate::error::IndexResult;
use crate::posting::{decode_keys, posting_key};

/// Pseudo-field matching every key of the bucket.
pub const BUCKET_FIELD: &str = "$bucket";

/// Pseudo-field matching a range of object keys.
pub const KEY_FIELD: &str = "$key";

/// A secondary-index query, resolved once from the request parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexQuery {
    /// All keys in the bucket.
    AllKeysInBucket,
    /// Object keys in `[start, end]`; empty `end` is unbounded.
    KeyRangeInBucket { start: String, end: String },
    /// Keys of objects declaring exactly `field=value`.
    ExactLookup { field: String, value: String },
    /// Keys of objects whose `field` value lies in `[start, end]`.
    RangeLookup {
        field: String,
        start: String,
        end: String,
    },
}

impl IndexQuery {
    /// Resolve a `(field, start, end)` request; `end` is absent for exact
    /// lookups.
    pub fn from_request(field: &str, start: &str, end: Option<&str>) -> Self {
        let end = end.unwrap_or_default();
        match field {
            BUCKET_FIELD => IndexQuery::AllKeysInBucket,
            KEY_FIELD => IndexQuery::KeyRangeInBucket {
                start: start.to_string(),
                end: end.to_string(),
            },
            _ if end.is_empty() => IndexQuery::ExactLookup {
                field: field.to_string(),
                value: start.to_string(),
            },
            _ => IndexQuery::RangeLookup {
                field: field.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            },
        }
    }
}

/// Run `query` against `bucket`.
///
/// Returns `None` when a posting lookup targets a bucket that has no index
/// store. Key queries on unknown buckets return an empty list.
pub fn query(
    stores: &BucketStoreManager,
    bucket: &str,
    query: &IndexQuery,
) -> IndexResult<Option<Vec<String>>> {
    debug!(bucket, ?query, "index query");
    match query {
        IndexQuery::AllKeysInBucket => Ok(Some(stores.list_keys(bucket)?)),
        IndexQuery::KeyRangeInBucket { start, end } => {
            Ok(Some(stores.key_range(bucket, start, end)?))
        }
        IndexQuery::ExactLookup { field, value } => {
            let Some(index) = stores.existing_index_store(bucket) else {
                return Ok(None);
            };
            let keys = index
                .get(&posting_key(field, value))?
                .map(|list| decode_keys(&list))
                .unwrap_or_default();
            Ok(Some(keys))
        }
        IndexQuery::RangeLookup { field, start, end } => {
            let Some(index) = stores.existing_index_store(bucket) else {
                return Ok(None);
            };
            let low = posting_key(field, start);
            let high = posting_key(field, end);
            let keys = index
                .scan_entries(&low, Some(high.as_slice()))?
                .into_iter()
                .flat_map(|(_, list)| decode_keys(&list))
                .collect();
            Ok(Some(keys))
        }
    }
}
