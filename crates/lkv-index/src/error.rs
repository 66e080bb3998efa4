//! Error types for the index crate.

/// Errors that can occur during index maintenance or queries.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Reading postings or committing the batch failed.
    #[error("store error: {0}")]
    Store(#[from] lkv_store::StoreError),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
