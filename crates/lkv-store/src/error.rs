/// Errors from decoding a stored object blob.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The blob cannot hold a length prefix plus at least one byte.
    #[error("encoded object too short: {0} bytes")]
    TooShort(usize),

    /// The length prefix points past the end of the blob.
    #[error("metadata length {declared} exceeds available {available} bytes")]
    LengthOutOfBounds { declared: usize, available: usize },

    /// The metadata segment is larger than a 32-bit prefix can describe.
    #[error("metadata too large: {0} bytes")]
    MetadataTooLarge(usize),

    /// Metadata JSON could not be (de)serialized.
    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from bucket store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A bucket store could not be opened or created.
    #[error("failed to open bucket store {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: redb::DatabaseError,
    },

    /// The name cannot be used as a bucket (reserved, hidden, or a path).
    #[error("invalid bucket name: {0:?}")]
    InvalidBucketName(String),

    /// Read, write, or batch failure inside the storage engine.
    #[error("storage engine error: {0}")]
    Engine(#[from] redb::Error),

    /// Filesystem error around the store directories.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A key stream producer stopped without signaling the end of the stream.
    #[error("key stream for bucket {0} ended unexpectedly")]
    StreamInterrupted(String),
}

macro_rules! engine_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Engine(redb::Error::from(err))
                }
            }
        )*
    };
}

engine_error!(
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
