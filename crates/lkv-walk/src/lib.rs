//! Link walking for LevelKV.
//!
//! Objects reference each other through the link header stored in their
//! metadata. A walk starts at one object and runs a list of phases
//! (`bucket,tag,keep`); each phase follows the matching links of the current
//! frontier, and the fetched objects become the next frontier.
//!
//! The response is one `multipart/mixed` body with a nested container per
//! phase. Parts are emitted for the last phase and for every phase whose
//! `keep` flag is `1`.
//!
//! # Example
//!
//! ```text
//! GET /buckets/list/keys/1/_,next,1/_,next,0
//! ```

pub mod error;
pub mod link;
pub mod multipart;
pub mod phase;
pub mod walker;

pub use error::{WalkError, WalkResult};
pub use link::{parse_link, parse_links, query_links, Link, LinkFilter, WILDCARD};
pub use multipart::MultipartWriter;
pub use phase::{parse_phases, WalkPhase};
pub use walker::{walk, ObjectSource, WalkResponse};
