//! Link header grammar.
//!
//! A link header holds comma-separated descriptors such as
//! `</buckets/list/keys/1>; riaktag="next"`. Three path shapes are accepted:
//!
//! ```text
//! </bucket/key>
//! </riak/bucket/key>            any single leading segment
//! </buckets/bucket/keys/key>
//! ```
//!
//! Descriptors without a `riaktag` or with any other path shape are dropped.

use std::fmt;

/// Filter value matching anything.
pub const WILDCARD: &str = "_";

/// A directed edge from one stored object to another.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub bucket: String,
    pub key: String,
    pub tag: String,
}

impl Link {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "</buckets/{}/keys/{}>; riaktag=\"{}\"",
            self.bucket, self.key, self.tag
        )
    }
}

/// Parse one link descriptor. Returns `None` if it is malformed.
pub fn parse_link(descriptor: &str) -> Option<Link> {
    let descriptor = descriptor.trim().strip_prefix('<')?;
    let (path, params) = descriptor.split_once('>')?;
    let (bucket, key) = parse_path(path)?;
    let tag = parse_tag(params)?;
    Some(Link::new(bucket, key, tag))
}

fn parse_path(path: &str) -> Option<(&str, &str)> {
    let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    match segments.as_slice() {
        ["buckets", bucket, "keys", key] | [_, bucket, key] | [bucket, key] => {
            Some((*bucket, *key))
        }
        _ => None,
    }
}

fn parse_tag(params: &str) -> Option<&str> {
    params
        .trim_start()
        .strip_prefix(';')?
        .split(';')
        .find_map(|param| {
            param
                .trim()
                .strip_prefix("riaktag=\"")
                .and_then(|rest| rest.split_once('"'))
                .map(|(tag, _)| tag)
        })
        .filter(|tag| !tag.is_empty())
}

/// Parse a whole link header, keeping valid descriptors in header order.
pub fn parse_links(header: &str) -> Vec<Link> {
    header.split(',').filter_map(parse_link).collect()
}

/// Matches a link component exactly or, for `_`, anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkFilter {
    Any,
    Exact(String),
}

impl LinkFilter {
    pub fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            LinkFilter::Any
        } else {
            LinkFilter::Exact(raw.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            LinkFilter::Any => true,
            LinkFilter::Exact(expected) => expected == value,
        }
    }
}

/// Links in `header` whose bucket and tag pass the filters, in header order.
pub fn query_links(header: &str, bucket: &LinkFilter, tag: &LinkFilter) -> Vec<Link> {
    parse_links(header)
        .into_iter()
        .filter(|link| bucket.matches(&link.bucket) && tag.matches(&link.tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "</list/1>; riaktag=\"previous\", \
                          </buckets/list/keys/3>; riaktag=\"next\", \
                          </riak/list2/9>; riaktag=\"next\"";

    #[test]
    fn parses_every_path_shape() {
        let expected = Some(Link::new("list", "1", "previous"));
        assert_eq!(parse_link("</list/1>; riaktag=\"previous\""), expected);
        assert_eq!(parse_link("</buckets/list/keys/1>; riaktag=\"previous\""), expected);
        assert_eq!(parse_link("  </riak/list/1>;riaktag=\"previous\""), expected);
    }

    #[test]
    fn drops_malformed_descriptors() {
        assert_eq!(parse_link("</buckets/list>; rel=\"up\""), None);
        assert_eq!(parse_link("</list/1>"), None);
        assert_eq!(parse_link("</list/1>; riaktag=\"\""), None);
        assert_eq!(parse_link("</a/b/c/d/e>; riaktag=\"t\""), None);
        assert_eq!(parse_link("list/1; riaktag=\"t\""), None);
        assert_eq!(parse_link("<//1>; riaktag=\"t\""), None);
        assert_eq!(parse_link(""), None);
    }

    #[test]
    fn query_filters_by_bucket_and_tag() {
        let any = LinkFilter::Any;
        let list = query_links(HEADER, &LinkFilter::parse("list"), &any);
        assert_eq!(
            list,
            vec![Link::new("list", "1", "previous"), Link::new("list", "3", "next")]
        );

        let all = query_links(HEADER, &any, &LinkFilter::parse("_"));
        assert_eq!(all.len(), 3);
        assert_eq!(all[2], Link::new("list2", "9", "next"));

        let next = query_links(HEADER, &any, &LinkFilter::parse("next"));
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn up_link_is_ignored() {
        let header = format!("</buckets/list>; rel=\"up\", {HEADER}");
        assert_eq!(parse_links(&header).len(), 3);
    }

    #[test]
    fn display_uses_bucket_path_shape() {
        let link = Link::new("b", "k", "t");
        assert_eq!(parse_link(&link.to_string()), Some(link));
    }
}
