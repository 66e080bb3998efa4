//! High-level LevelKV database.
//!
//! [`Database`] ties the storage, index, and walk crates together: it stores
//! and deletes objects while keeping postings current, answers index
//! queries, and runs link walks over stored objects. This is the entry point
//! used by the HTTP server and the command-line tool.

pub mod database;
pub mod error;
pub mod object;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use object::{Object, StoreReceipt};

// Re-export the request-level types callers need.
pub use lkv_index::IndexQuery;
pub use lkv_store::KeyStream;
pub use lkv_types::{Metadata, ObjectKey};
pub use lkv_walk::WalkResponse;
