use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("store error: {0}")]
    Store(#[from] lkv_store::StoreError),

    #[error("corrupt object: {0}")]
    Codec(#[from] lkv_store::CodecError),

    #[error("index error: {0}")]
    Index(#[from] lkv_index::IndexError),

    #[error("walk error: {0}")]
    Walk(#[from] lkv_walk::WalkError),
}

impl DbError {
    /// Returns `true` if the request itself was at fault.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            DbError::Walk(lkv_walk::WalkError::BadRequest(_))
                | DbError::Store(lkv_store::StoreError::InvalidBucketName(_))
        )
    }
}

pub type DbResult<T> = Result<T, DbError>;
