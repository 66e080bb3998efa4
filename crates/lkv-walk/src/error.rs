//! Error types for the walk crate.

/// Errors that can occur while walking links.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// The walk request itself is malformed.
    #[error("bad walk request: {0}")]
    BadRequest(String),

    /// Fetching an object from the source failed. The walk is aborted.
    #[error("object source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WalkError {
    /// Wrap an error raised by an [`ObjectSource`](crate::ObjectSource).
    pub fn from_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        WalkError::Source(Box::new(err))
    }
}

/// Convenience alias for walk results.
pub type WalkResult<T> = Result<T, WalkError>;
