//! Mapping between transport headers and [`Metadata`].
//!
//! This is the only place where header names are interpreted as strings.
//! Inbound, [`Metadata::from_headers`] accepts any `(name, value)` sequence;
//! outbound, [`Metadata::to_headers`] renders the headers a client sees on
//! fetch.

use crate::metadata::{IndexPair, Metadata};

/// Prefix of secondary-index headers (`X-Riak-Index-<field>`).
pub const INDEX_HEADER_PREFIX: &str = "x-riak-index-";
/// Prefix of user metadata headers (`X-Riak-Meta-<key>`).
pub const META_HEADER_PREFIX: &str = "x-riak-meta-";
/// Version-vector header emitted on every object response.
pub const VCLOCK_HEADER: &str = "X-Riak-Vclock";
/// Constant version vector. Clocks are never computed.
pub const VCLOCK_PLACEHOLDER: &str = "a85hYGBgzGDKBVIcypz/fgaUHjmdwZTImMfKcN3h1Um+LAA=";

/// Strip `prefix` from `name`, ignoring ASCII case.
fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    if name.len() > prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&name[prefix.len()..])
    } else {
        None
    }
}

impl Metadata {
    /// Build metadata from request headers.
    ///
    /// Recognized headers are `Link`, `Content-Type`, `X-Riak-Index-*` and
    /// `X-Riak-Meta-*`; index fields and meta keys are lower-cased. Headers
    /// with empty values are dropped, and when a header name repeats only its
    /// first value is kept. Everything else is ignored.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut meta = Metadata::new();
        for (name, value) in headers {
            if value.is_empty() {
                continue;
            }

            if name.eq_ignore_ascii_case("link") {
                if meta.links.is_empty() {
                    meta.links = value.to_string();
                }
            } else if name.eq_ignore_ascii_case("content-type") {
                if meta.content_type.is_empty() {
                    meta.content_type = value.to_string();
                }
            } else if let Some(field) = strip_prefix_ignore_case(name, INDEX_HEADER_PREFIX) {
                let field = field.to_ascii_lowercase();
                if !meta.indexes.iter().any(|p| p.field == field) {
                    meta.indexes.push(IndexPair::new(field, value));
                }
            } else if let Some(key) = strip_prefix_ignore_case(name, META_HEADER_PREFIX) {
                meta.meta
                    .entry(key.to_ascii_lowercase())
                    .or_insert_with(|| value.to_string());
            }
        }
        meta
    }

    /// Render the headers returned with an object stored in `bucket`.
    ///
    /// The `Link` header always starts with an `up` link to the bucket,
    /// followed by the stored links.
    pub fn to_headers(&self, bucket: &str) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(3 + self.indexes.len() + self.meta.len());

        let mut links = format!("</buckets/{bucket}>; rel=\"up\"");
        if !self.links.is_empty() {
            links.push_str(", ");
            links.push_str(&self.links);
        }
        headers.push(("Link".to_string(), links));

        if !self.content_type.is_empty() {
            headers.push(("Content-Type".to_string(), self.content_type.clone()));
        }
        for index in &self.indexes {
            headers.push((format!("X-Riak-Index-{}", index.field), index.value.clone()));
        }
        for (key, value) in &self.meta {
            headers.push((format!("X-Riak-Meta-{key}"), value.clone()));
        }
        headers.push((VCLOCK_HEADER.to_string(), VCLOCK_PLACEHOLDER.to_string()));
        headers
    }
}
