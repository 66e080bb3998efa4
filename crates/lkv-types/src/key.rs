use uuid::Uuid;

/// Generator for server-assigned object keys.
///
/// Keys are random 128-bit identifiers with RFC 4122 version 4 bits set,
/// rendered as 32 lowercase hex characters without dashes.
pub struct ObjectKey;

impl ObjectKey {
    pub fn generate() -> String {
        Uuid::new_v4().simple().to_string()
    }
}
