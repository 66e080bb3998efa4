use lkv_types::Metadata;

/// A stored object: metadata plus opaque payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Object {
    pub meta: Metadata,
    pub payload: Vec<u8>,
}

impl Object {
    pub fn new(meta: Metadata, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            meta,
            payload: payload.into(),
        }
    }
}

/// Outcome of a store operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreReceipt {
    /// Key the object was stored under.
    pub key: String,
    /// `true` if the key was generated by the server.
    pub generated: bool,
    /// `true` if an existing object was replaced.
    pub replaced: bool,
}
