//! Posting maintenance: turn an [`IndexDiff`] into one atomic batch.

use lkv_store::{OrderedStore, WriteBatch};
use tracing::debug;

use crate::diff::IndexDiff;
use crate::error::IndexResult;
use crate::posting::{append_key, posting_key_for, remove_key};

/// Build the batch that applies `diff` for `object_key`.
///
/// Postings are read through the batch first, so two pairs touching the
/// same posting compose. Any read error aborts before anything is staged
/// against the store.
pub fn build_batch(
    diff: &IndexDiff,
    object_key: &str,
    store: &dyn OrderedStore,
) -> IndexResult<WriteBatch> {
    let key = object_key.as_bytes();
    let mut batch = WriteBatch::new();

    for pair in &diff.added {
        let pkey = posting_key_for(pair);
        let current = read_posting(&batch, store, &pkey)?;
        let updated = append_key(&current, key);
        if updated != current {
            batch.put(&pkey, &updated);
        }
    }

    for pair in &diff.removed {
        let pkey = posting_key_for(pair);
        let current = read_posting(&batch, store, &pkey)?;
        if current.is_empty() {
            continue;
        }
        let updated = remove_key(&current, key);
        if updated.is_empty() {
            batch.delete(&pkey);
        } else if updated != current {
            batch.put(&pkey, &updated);
        }
    }

    Ok(batch)
}

/// Apply `diff` for `object_key` to the posting store as one atomic batch.
pub fn apply(diff: &IndexDiff, object_key: &str, store: &dyn OrderedStore) -> IndexResult<()> {
    if diff.is_empty() {
        return Ok(());
    }
    let batch = build_batch(diff, object_key, store)?;
    debug!(
        key = object_key,
        added = diff.added.len(),
        removed = diff.removed.len(),
        ops = batch.len(),
        "applying index batch"
    );
    if !batch.is_empty() {
        store.write(batch)?;
    }
    Ok(())
}

fn read_posting(batch: &WriteBatch, store: &dyn OrderedStore, key: &[u8]) -> IndexResult<Vec<u8>> {
    match batch.staged(key) {
        Some(staged) => Ok(staged.map(<[u8]>::to_vec).unwrap_or_default()),
        None => Ok(store.get(key)?.unwrap_or_default()),
    }
}
