/// A buffered mutation in a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Collects puts and deletes that are committed atomically by
/// [`OrderedStore::write`](crate::OrderedStore::write).
///
/// Nothing is applied until the batch is written; dropping it discards
/// every buffered operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a put.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> &mut Self {
        self.ops.push(BatchOp::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        });
        self
    }

    /// Buffer a delete.
    pub fn delete(&mut self, key: &[u8]) -> &mut Self {
        self.ops.push(BatchOp::Delete { key: key.to_vec() });
        self
    }

    /// The most recent staged state of `key`.
    ///
    /// Returns `None` when the batch does not touch `key`,
    /// `Some(None)` when it is staged for deletion, and `Some(Some(value))`
    /// for a staged put.
    pub fn staged(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        self.ops.iter().rev().find(|op| op.key() == key).map(|op| match op {
            BatchOp::Put { value, .. } => Some(value.as_slice()),
            BatchOp::Delete { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_reports_latest_op() {
        let mut batch = WriteBatch::new();
        assert_eq!(batch.staged(b"k"), None);

        batch.put(b"k", b"v1");
        assert_eq!(batch.staged(b"k"), Some(Some(&b"v1"[..])));

        batch.delete(b"k");
        assert_eq!(batch.staged(b"k"), Some(None));

        batch.put(b"k", b"v2");
        assert_eq!(batch.staged(b"k"), Some(Some(&b"v2"[..])));
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert!(batch.into_ops().is_empty());
    }
}
