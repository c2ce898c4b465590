//! Object hashing.
//!
//! Objects are identified by the SHA-1 digest of their serialized form,
//! `<type> <size>\0<payload>`, so identical content always produces the
//! same id regardless of when or where it is written.

use sha1::{Digest, Sha1};

/// Digest size in bytes.
pub const HASH_SIZE: usize = 20;

/// Computes the object id digest for a payload of the given type.
///
/// The empty blob hashes to `e69de29bb2d1d6434b8b29ae775ad8c2e48c5391`.
pub fn hash_object(object_type: &str, content: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha1::new();
    hasher.update(object_type.as_bytes());
    hasher.update(b" ");
    hasher.update(content.len().to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(content);
    hasher.finalize().into()
}
