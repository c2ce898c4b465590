//! Blob object implementation.

use super::store::{ObjectType, RawObject};
use crate::error::{Error, Result};

/// A blob object: an opaque, immutable byte payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content: Vec<u8>,
}

impl Blob {
    /// Parses a Blob from a RawObject.
    pub fn parse(raw: RawObject) -> Result<Self> {
        if raw.object_type != ObjectType::Blob {
            return Err(Error::TypeMismatch {
                expected: "blob",
                actual: raw.object_type.as_str(),
            });
        }

        Ok(Blob {
            content: raw.content,
        })
    }

    /// Creates a Blob directly from bytes.
    pub fn from_bytes(content: Vec<u8>) -> Self {
        Blob { content }
    }

    /// Returns the blob's content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns true if the content looks binary (contains a NUL byte).
    pub fn is_binary(&self) -> bool {
        self.content.contains(&0)
    }

    /// Returns the content as UTF-8 text, if valid.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}
