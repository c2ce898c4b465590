//! Object ID representation.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The length of an object id in bytes.
pub const OID_BYTES: usize = 20;

/// The length of an object id as a hexadecimal string.
pub const OID_HEX_LEN: usize = 40;

/// A content-addressed object id.
///
/// A 20-byte SHA-1 digest over an object's serialized form, used as the
/// sole identity and lookup key for blobs, trees, and commits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    bytes: [u8; OID_BYTES],
}

impl Oid {
    /// Creates an Oid from a 40-character hexadecimal string
    /// (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use minigit::objects::Oid;
    ///
    /// let oid = Oid::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
    /// assert_eq!(oid.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    /// ```
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != OID_HEX_LEN {
            return Err(Error::InvalidOid(hex_str.to_string()));
        }

        let mut bytes = [0u8; OID_BYTES];
        hex::decode_to_slice(hex_str, &mut bytes)
            .map_err(|_| Error::InvalidOid(hex_str.to_string()))?;

        Ok(Oid { bytes })
    }

    /// Creates an Oid from a raw 20-byte digest.
    pub fn from_bytes(bytes: [u8; OID_BYTES]) -> Self {
        Oid { bytes }
    }

    /// Returns the lowercase hexadecimal representation of this Oid.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Returns a short (7-character) hexadecimal form for display.
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    /// Returns a reference to the raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; OID_BYTES] {
        &self.bytes
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.short())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Oid::from_hex(s)
    }
}
