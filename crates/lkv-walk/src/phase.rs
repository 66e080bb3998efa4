use crate::error::{WalkError, WalkResult};
use crate::link::LinkFilter;

/// One step of a link walk: `bucket,tag,keep`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkPhase {
    pub bucket: LinkFilter,
    pub tag: LinkFilter,
    /// Include this phase's objects in the response even when it is not the
    /// last phase.
    pub keep: bool,
}

impl WalkPhase {
    /// Parse a `bucket,tag,keep` descriptor; `keep` is set only by `1`.
    pub fn parse(raw: &str) -> WalkResult<Self> {
        let fields: Vec<&str> = raw.split(',').collect();
        let [bucket, tag, keep] = fields.as_slice() else {
            return Err(WalkError::BadRequest(format!(
                "walk phase `{raw}` must have exactly 3 comma-separated fields"
            )));
        };
        Ok(Self {
            bucket: LinkFilter::parse(bucket),
            tag: LinkFilter::parse(tag),
            keep: *keep == "1",
        })
    }
}

/// Parse every phase before any object is fetched. Zero phases is an error.
pub fn parse_phases<S: AsRef<str>>(raw: &[S]) -> WalkResult<Vec<WalkPhase>> {
    if raw.is_empty() {
        return Err(WalkError::BadRequest("walk needs at least one phase".into()));
    }
    raw.iter().map(|p| WalkPhase::parse(p.as_ref())).collect()
}
