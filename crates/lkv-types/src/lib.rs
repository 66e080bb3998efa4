//! Foundation types for LevelKV.
//!
//! LevelKV stores objects under `(bucket, key)` pairs. Every object carries a
//! [`Metadata`] value next to its opaque payload. This crate defines that
//! metadata, the secondary-index declarations inside it, object key
//! generation, and the single boundary where HTTP-style headers are turned
//! into typed metadata and back.
//!
//! # Key Types
//!
//! - [`Metadata`]: Index declarations, raw link header, user meta, content type
//! - [`IndexPair`]: One `(field, value)` index declaration (value may be comma-joined)
//! - [`ObjectKey`]: Generator for server-assigned object keys

pub mod headers;
pub mod key;
pub mod metadata;

pub use headers::{
    INDEX_HEADER_PREFIX, META_HEADER_PREFIX, VCLOCK_HEADER, VCLOCK_PLACEHOLDER,
};
pub use key::ObjectKey;
pub use metadata::{IndexPair, Metadata};
