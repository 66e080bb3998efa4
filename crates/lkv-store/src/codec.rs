//! Binary encoding of stored objects.
//!
//! ```text
//! [4 bytes: metadata length (big-endian u32)]
//! [N bytes: metadata (compact JSON)]
//! [rest:    raw payload]
//! ```
//!
//! There is no checksum. Payload corruption that leaves the metadata
//! boundary intact is not detected.

use lkv_types::Metadata;

use crate::error::{CodecError, CodecResult};

/// Size of the metadata length prefix.
pub const PREFIX_SIZE: usize = 4;

/// Encode metadata and payload into a single blob.
pub fn encode(meta: &Metadata, payload: &[u8]) -> CodecResult<Vec<u8>> {
    let meta_bytes = serde_json::to_vec(meta)?;
    let len = u32::try_from(meta_bytes.len())
        .map_err(|_| CodecError::MetadataTooLarge(meta_bytes.len()))?;

    let mut buf = Vec::with_capacity(PREFIX_SIZE + meta_bytes.len() + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&meta_bytes);
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Decode a blob into metadata and a borrowed payload slice.
pub fn decode(blob: &[u8]) -> CodecResult<(Metadata, &[u8])> {
    if blob.len() <= PREFIX_SIZE {
        return Err(CodecError::TooShort(blob.len()));
    }
    let mut prefix = [0u8; PREFIX_SIZE];
    prefix.copy_from_slice(&blob[..PREFIX_SIZE]);
    let declared = u32::from_be_bytes(prefix) as usize;

    let available = blob.len() - PREFIX_SIZE;
    if declared > available {
        return Err(CodecError::LengthOutOfBounds {
            declared,
            available,
        });
    }

    let end = PREFIX_SIZE + declared;
    let meta: Metadata = serde_json::from_slice(&blob[PREFIX_SIZE..end])?;
    Ok((meta, &blob[end..]))
}
