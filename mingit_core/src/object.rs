//! Object encoding.
//!
//! Blobs and commits carry a textual header before the payload:
//!
//! ```text
//! "blob <payload-len>\0"   ++ payload
//! "commit <payload-len>\0" ++ payload
//! ```
//!
//! Trees are stored as their canonical JSON entry list with no header. A tree
//! is recognized on read by its leading `[`.

use crate::error::{Error, Result};
use crate::hash::Hash;
use std::path::Path;

/// Upper bound on the header length scanned when decoding.
const MAX_HEADER_LEN: usize = 32;

/// Object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// File content.
    Blob,
    /// Directory listing.
    Tree,
    /// Snapshot metadata.
    Commit,
}

impl ObjectKind {
    /// Get the string name of this object kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }

    /// Whether objects of this kind are stored with a type header.
    pub fn has_header(&self) -> bool {
        !matches!(self, ObjectKind::Tree)
    }
}

/// Encode a payload into the bytes that are hashed and stored.
pub fn encode(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    if !kind.has_header() {
        return payload.to_vec();
    }

    let header = format!("{} {}\0", kind.as_str(), payload.len());
    let mut buf = Vec::with_capacity(header.len() + payload.len());
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Digest of the encoded object, without storing anything.
pub fn digest(kind: ObjectKind, payload: &[u8]) -> Hash {
    Hash::hash_bytes(&encode(kind, payload))
}

/// Split stored bytes into kind and payload.
///
/// `path` is only used for error reporting.
pub fn decode(path: &Path, data: &[u8]) -> Result<(ObjectKind, Vec<u8>)> {
    if let Some((kind, payload)) = split_header(path, data)? {
        return Ok((kind, payload.to_vec()));
    }

    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') => Ok((ObjectKind::Tree, data.to_vec())),
        _ => Err(Error::corrupted_object(path, "Unrecognized object header")),
    }
}

/// Parse a `"<kind> <len>\0"` header, if one is present.
fn split_header<'a>(path: &Path, data: &'a [u8]) -> Result<Option<(ObjectKind, &'a [u8])>> {
    let scan = &data[..data.len().min(MAX_HEADER_LEN)];
    let Some(nul) = scan.iter().position(|&b| b == 0) else {
        return Ok(None);
    };

    let Ok(header) = std::str::from_utf8(&data[..nul]) else {
        return Ok(None);
    };
    let Some((name, len)) = header.split_once(' ') else {
        return Ok(None);
    };

    let kind = match name {
        "blob" => ObjectKind::Blob,
        "commit" => ObjectKind::Commit,
        _ => return Ok(None),
    };

    let expected: usize = len
        .parse()
        .map_err(|_| Error::corrupted_object(path, format!("Invalid length in header: {len}")))?;
    let payload = &data[nul + 1..];
    if payload.len() != expected {
        return Err(Error::corrupted_object(
            path,
            format!(
                "Payload length mismatch: expected {}, got {}",
                expected,
                payload.len()
            ),
        ));
    }

    Ok(Some((kind, payload)))
}
