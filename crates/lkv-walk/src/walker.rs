use lkv_types::Metadata;
use tracing::debug;

use crate::error::WalkResult;
use crate::link::query_links;
use crate::multipart::MultipartWriter;
use crate::phase::WalkPhase;

/// Where the walker fetches objects from.
pub trait ObjectSource {
    /// Fetch `(bucket, key)`; `Ok(None)` if it does not exist.
    fn fetch(&self, bucket: &str, key: &str) -> WalkResult<Option<(Metadata, Vec<u8>)>>;
}

/// A resolved object held in a phase arena.
#[derive(Clone, Debug)]
struct WalkedObject {
    bucket: String,
    key: String,
    meta: Metadata,
    payload: Vec<u8>,
}

impl WalkedObject {
    fn part_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.meta.to_headers(&self.bucket);
        headers.push((
            "Location".to_string(),
            format!("/buckets/{}/keys/{}", self.bucket, self.key),
        ));
        headers
    }
}

/// Encoded walk result: an outer `multipart/mixed` body holding one nested
/// container per phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkResponse {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Walk links breadth-first from `(bucket, key)`.
///
/// `phases` must already be validated. Returns `Ok(None)` when the start
/// object does not exist. Link targets that do not exist are skipped; any
/// fetch error aborts the whole walk.
pub fn walk<S>(
    source: &S,
    bucket: &str,
    key: &str,
    phases: &[WalkPhase],
) -> WalkResult<Option<WalkResponse>>
where
    S: ObjectSource + ?Sized,
{
    let Some((meta, payload)) = source.fetch(bucket, key)? else {
        return Ok(None);
    };

    // Arena of the current frontier; replaced by the fetched objects of each phase.
    let mut arena = vec![WalkedObject {
        bucket: bucket.to_string(),
        key: key.to_string(),
        meta,
        payload,
    }];

    let mut outer = MultipartWriter::new();
    for (i, phase) in phases.iter().enumerate() {
        let last = i + 1 == phases.len();
        let mut container = MultipartWriter::new();
        let mut next = Vec::new();

        for node in &arena {
            for link in query_links(&node.meta.links, &phase.bucket, &phase.tag) {
                let Some((meta, payload)) = source.fetch(&link.bucket, &link.key)? else {
                    debug!(bucket = %link.bucket, key = %link.key, "skipping missing link target");
                    continue;
                };
                let object = WalkedObject {
                    bucket: link.bucket,
                    key: link.key,
                    meta,
                    payload,
                };
                if last || phase.keep {
                    container.add_part(&object.part_headers(), &object.payload);
                }
                if !last {
                    next.push(object);
                }
            }
        }

        debug!(
            phase = i,
            parts = container.part_count(),
            frontier = next.len(),
            "walk phase done"
        );
        outer.add_nested(container);
        arena = next;
    }

    Ok(Some(WalkResponse {
        content_type: outer.content_type(),
        body: outer.finish(),
    }))
}
