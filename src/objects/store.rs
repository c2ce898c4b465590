//! Loose object store implementation.
//!
//! Objects are persisted as individual zlib-compressed files under the
//! objects directory, at a path derived from their id. Writing is
//! idempotent: the id is a digest of the content, so the same bytes
//! always land in the same file and a second write is a no-op.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::oid::{Oid, OID_HEX_LEN};
use crate::error::{Error, Result};
use crate::infra::{compress, decompress, hash_object, read_file, write_file_atomic};

/// The type of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// A blob (file content).
    Blob,
    /// A tree (directory listing).
    Tree,
    /// A commit.
    Commit,
}

impl ObjectType {
    /// Returns the type name as used in object headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parses a type name from an object header.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(ObjectType::Blob),
            "tree" => Some(ObjectType::Tree),
            "commit" => Some(ObjectType::Commit),
            _ => None,
        }
    }
}

/// A raw object with its type and payload.
#[derive(Debug, Clone)]
pub struct RawObject {
    /// The type of the object.
    pub object_type: ObjectType,
    /// The payload of the object (without the header).
    pub content: Vec<u8>,
}

/// A content-addressed store of loose objects.
#[derive(Debug, Clone)]
pub struct LooseObjectStore {
    /// Path to the objects directory.
    objects_dir: PathBuf,
}

impl LooseObjectStore {
    /// Creates a new LooseObjectStore rooted at the given objects directory.
    pub fn new<P: AsRef<Path>>(objects_dir: P) -> Self {
        LooseObjectStore {
            objects_dir: objects_dir.as_ref().to_path_buf(),
        }
    }

    /// Converts an Oid to the path of its loose object file.
    ///
    /// `da39a3ee...` becomes `objects/da/39a3ee...`.
    pub fn oid_to_path(&self, oid: &Oid) -> PathBuf {
        let hex = oid.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    /// Reads the raw compressed bytes for an object.
    fn read_raw(&self, oid: &Oid) -> Result<Vec<u8>> {
        let path = self.oid_to_path(oid);
        read_file(&path).map_err(|e| {
            if matches!(e, Error::PathNotFound(_)) {
                Error::ObjectNotFound(oid.to_hex())
            } else {
                e
            }
        })
    }

    /// Parses a decompressed object into its type and payload.
    ///
    /// Objects have the format `<type> <size>\0<payload>`.
    fn parse_raw_object(data: &[u8], oid: &Oid) -> Result<RawObject> {
        let null_pos = data
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::CorruptObject {
                oid: oid.to_hex(),
                reason: "missing null byte in header".to_string(),
            })?;

        let header = std::str::from_utf8(&data[..null_pos]).map_err(|_| Error::CorruptObject {
            oid: oid.to_hex(),
            reason: "invalid UTF-8 in header".to_string(),
        })?;

        let mut parts = header.split(' ');
        let type_str = parts.next().ok_or_else(|| Error::CorruptObject {
            oid: oid.to_hex(),
            reason: "missing object type".to_string(),
        })?;
        let size_str = parts.next().ok_or_else(|| Error::CorruptObject {
            oid: oid.to_hex(),
            reason: "missing object size".to_string(),
        })?;

        let object_type = ObjectType::parse(type_str).ok_or_else(|| Error::CorruptObject {
            oid: oid.to_hex(),
            reason: format!("unknown object type: {}", type_str),
        })?;

        let size: usize = size_str.parse().map_err(|_| Error::CorruptObject {
            oid: oid.to_hex(),
            reason: format!("invalid size: {}", size_str),
        })?;

        let content = &data[null_pos + 1..];
        if content.len() != size {
            return Err(Error::CorruptObject {
                oid: oid.to_hex(),
                reason: format!(
                    "size mismatch: header says {} but payload is {} bytes",
                    size,
                    content.len()
                ),
            });
        }

        Ok(RawObject {
            object_type,
            content: content.to_vec(),
        })
    }

    /// Reads and parses an object by its Oid.
    ///
    /// # Errors
    ///
    /// - `Error::ObjectNotFound` if no object with that id exists.
    /// - `Error::DecompressionFailed` if the stored file is not valid zlib.
    /// - `Error::CorruptObject` if the decompressed bytes are malformed.
    pub fn read(&self, oid: &Oid) -> Result<RawObject> {
        let compressed = self.read_raw(oid)?;
        let decompressed = decompress(&compressed)?;
        Self::parse_raw_object(&decompressed, oid)
    }

    /// Checks if an object exists in the store.
    pub fn exists(&self, oid: &Oid) -> bool {
        self.oid_to_path(oid).exists()
    }

    /// Writes an object to the store, returning its id.
    ///
    /// The id is `digest(<type> <size>\0<payload>)`. If an object with
    /// that id is already present the write is a no-op, so writing the
    /// same logical content twice never duplicates storage.
    pub fn write(&self, object_type: ObjectType, content: &[u8]) -> Result<Oid> {
        let hash = hash_object(object_type.as_str(), content);
        let oid = Oid::from_bytes(hash);

        let path = self.oid_to_path(&oid);
        if path.exists() {
            return Ok(oid);
        }

        let header = format!("{} {}\0", object_type.as_str(), content.len());
        let mut raw = header.into_bytes();
        raw.extend_from_slice(content);

        let compressed = compress(&raw);
        write_file_atomic(&path, &compressed)?;

        debug!(
            oid = %oid,
            kind = object_type.as_str(),
            size = content.len(),
            "stored object"
        );

        Ok(oid)
    }

    /// Finds objects whose id starts with the given hex prefix.
    ///
    /// Used to resolve abbreviated ids; the prefix must be at least
    /// 4 hex characters.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Oid>> {
        if prefix.len() < 4
            || prefix.len() > OID_HEX_LEN
            || !prefix.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(Error::InvalidOid(prefix.to_string()));
        }

        let prefix_lower = prefix.to_lowercase();
        let dir_prefix = &prefix_lower[..2];
        let file_prefix = &prefix_lower[2..];

        let subdir = self.objects_dir.join(dir_prefix);
        if !subdir.exists() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in fs::read_dir(&subdir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            if name.starts_with(file_prefix) {
                let full_hex = format!("{}{}", dir_prefix, name);
                if full_hex.len() == OID_HEX_LEN {
                    if let Ok(oid) = Oid::from_hex(&full_hex) {
                        matches.push(oid);
                    }
                }
            }
        }

        Ok(matches)
    }
}
