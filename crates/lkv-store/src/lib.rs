//! Bucket storage for LevelKV.
//!
//! Every bucket is an independent ordered key-value store. Values are object
//! blobs produced by the [`codec`]: a big-endian length prefix, the object's
//! metadata, then the raw payload.
//!
//! # Storage Backends
//!
//! All backends implement the [`OrderedStore`] trait:
//!
//! - [`BucketStore`] -- redb database file, one per bucket directory
//! - [`InMemoryStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Layout
//!
//! ```text
//! <base>/<bucket>/data.redb            objects of <bucket>
//! <base>/_indexes/<bucket>/data.redb   postings of <bucket>
//! ```
//!
//! # Design Rules
//!
//! 1. Buckets are created lazily on first write and never auto-destroyed.
//! 2. A [`WriteBatch`] is applied atomically or not at all.
//! 3. Keys are ordered by raw bytes.
//! 4. All engine and I/O errors are propagated, never silently ignored.

pub mod batch;
pub mod bucket;
pub mod codec;
pub mod error;
pub mod manager;
pub mod memory;
pub mod registry;
pub mod stream;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use batch::{BatchOp, WriteBatch};
pub use bucket::BucketStore;
pub use error::{CodecError, CodecResult, StoreError, StoreResult};
pub use manager::{BucketStoreManager, INDEX_NAMESPACE};
pub use memory::InMemoryStore;
pub use registry::{is_valid_bucket_name, BucketRegistry};
pub use stream::KeyStream;
pub use traits::OrderedStore;
