//! Secondary indexes for LevelKV.
//!
//! Every bucket has a posting store mapping `field~value` to the tab-joined
//! keys of the objects that declare that pair. Postings are never written
//! directly: each object write computes an [`IndexDiff`] between the old and
//! new declarations and [`apply`] commits the resulting posting updates as
//! one atomic batch.
//!
//! Queries are resolved once into an [`IndexQuery`]; the `$bucket` and
//! `$key` pseudo-fields scan the data bucket instead of postings.

pub mod diff;
pub mod engine;
pub mod error;
pub mod posting;
pub mod query;

pub use diff::{diff, IndexDiff};
pub use engine::{apply, build_batch};
pub use error::{IndexError, IndexResult};
pub use query::{query, IndexQuery, BUCKET_FIELD, KEY_FIELD};
