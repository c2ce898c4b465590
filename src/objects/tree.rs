//! Tree objects and the builder used to assemble them.

use std::fmt;

use super::oid::{Oid, OID_BYTES};
use super::store::{LooseObjectStore, ObjectType, RawObject};
use crate::error::{Error, Result};

/// File mode of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileMode {
    /// Regular file (100644).
    Regular,
    /// Executable file (100755).
    Executable,
    /// Symbolic link (120000).
    Symlink,
    /// Directory (040000).
    Directory,
}

impl FileMode {
    /// Parses a mode from its octal string form, as stored in trees.
    ///
    /// Tree payloads use `40000` for directories (no leading zero).
    pub fn from_octal(s: &str) -> Option<Self> {
        match s {
            "100644" => Some(FileMode::Regular),
            "100755" => Some(FileMode::Executable),
            "120000" => Some(FileMode::Symlink),
            "40000" | "040000" => Some(FileMode::Directory),
            _ => None,
        }
    }

    /// Returns the octal string form used when serializing a tree.
    pub fn as_octal(&self) -> &'static str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
            FileMode::Symlink => "120000",
            FileMode::Directory => "40000",
        }
    }

    /// Returns the zero-padded octal form used in patch headers.
    pub fn as_octal_padded(&self) -> &'static str {
        match self {
            FileMode::Directory => "040000",
            other => other.as_octal(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FileMode::Regular | FileMode::Executable)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FileMode::Directory)
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, FileMode::Executable)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_octal())
    }
}

/// A single entry in a tree: a named pointer to a blob or subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    mode: FileMode,
    name: String,
    oid: Oid,
}

impl TreeEntry {
    /// Creates a new tree entry.
    pub fn new<S: Into<String>>(mode: FileMode, name: S, oid: Oid) -> Self {
        TreeEntry {
            mode,
            name: name.into(),
            oid,
        }
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }
}

/// A parsed tree object: a sorted list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    oid: Oid,
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Parses a tree from a raw object.
    ///
    /// Tree payloads are a sequence of `<mode> <name>\0<20-byte oid>`
    /// records with no separators.
    pub fn parse(oid: Oid, raw: &RawObject) -> Result<Self> {
        if raw.object_type != ObjectType::Tree {
            return Err(Error::TypeMismatch {
                expected: "tree",
                actual: raw.object_type.as_str(),
            });
        }

        let data = &raw.content;
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            let space = data[pos..]
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| Error::CorruptObject {
                    oid: oid.to_hex(),
                    reason: "tree entry missing space after mode".to_string(),
                })?;
            let mode_str =
                std::str::from_utf8(&data[pos..pos + space]).map_err(|_| Error::CorruptObject {
                    oid: oid.to_hex(),
                    reason: "tree entry mode is not UTF-8".to_string(),
                })?;
            let mode = FileMode::from_octal(mode_str).ok_or_else(|| Error::CorruptObject {
                oid: oid.to_hex(),
                reason: format!("unknown file mode: {}", mode_str),
            })?;
            pos += space + 1;

            let null = data[pos..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::CorruptObject {
                    oid: oid.to_hex(),
                    reason: "tree entry missing null after name".to_string(),
                })?;
            let name =
                std::str::from_utf8(&data[pos..pos + null]).map_err(|_| Error::CorruptObject {
                    oid: oid.to_hex(),
                    reason: "tree entry name is not UTF-8".to_string(),
                })?;
            if name.is_empty() {
                return Err(Error::CorruptObject {
                    oid: oid.to_hex(),
                    reason: "tree entry has empty name".to_string(),
                });
            }
            pos += null + 1;

            if pos + OID_BYTES > data.len() {
                return Err(Error::CorruptObject {
                    oid: oid.to_hex(),
                    reason: "tree entry truncated before oid".to_string(),
                });
            }
            let mut bytes = [0u8; OID_BYTES];
            bytes.copy_from_slice(&data[pos..pos + OID_BYTES]);
            pos += OID_BYTES;

            entries.push(TreeEntry::new(mode, name, Oid::from_bytes(bytes)));
        }

        Ok(Tree { oid, entries })
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Looks up an entry by name.
    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Serializes sorted entries into the on-disk tree payload.
fn serialize_entries(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(entry.mode.as_octal().as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.oid.as_bytes());
    }
    out
}

/// Assembles a tree object entry by entry.
///
/// Entries may be inserted in any order; `build` sorts them by name
/// before serializing, so the resulting id depends only on the set of
/// entries. Inserting two entries with the same name is rejected at
/// build time.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    entries: Vec<TreeEntry>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// Adds an entry to the tree being built.
    pub fn insert<S: Into<String>>(&mut self, mode: FileMode, name: S, oid: Oid) -> &mut Self {
        self.entries.push(TreeEntry::new(mode, name, oid));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sorts, serializes and writes the tree, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateEntry` if two entries share a name.
    pub fn build(mut self, store: &LooseObjectStore) -> Result<Oid> {
        self.entries.sort_by(|a, b| a.name.cmp(&b.name));

        for pair in self.entries.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(Error::DuplicateEntry(pair[0].name.clone()));
            }
        }

        let payload = serialize_entries(&self.entries);
        store.write(ObjectType::Tree, &payload)
    }
}
