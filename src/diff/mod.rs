//! Tree-to-tree diffing.
//!
//! Two trees are compared by flattening each into a path-to-entry map
//! (recursing through subtrees) and walking the union of paths. The
//! result is a list of deltas ordered by path, so diffing is
//! deterministic, and swapping the two sides swaps Added and Deleted
//! while keeping the same paths.

pub mod patch;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::objects::{FileMode, LooseObjectStore, Oid, Tree};

pub use patch::format_patch;

/// What happened to a path between two trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    /// Present only in the new tree.
    Added,
    /// Present only in the old tree.
    Deleted,
    /// Present in both with different content.
    Modified,
    /// Same content, different file mode.
    ModeChanged,
}

impl DiffStatus {
    /// Single-letter status code, as printed in summaries.
    pub fn as_char(&self) -> char {
        match self {
            DiffStatus::Added => 'A',
            DiffStatus::Deleted => 'D',
            DiffStatus::Modified => 'M',
            DiffStatus::ModeChanged => 'T',
        }
    }
}

/// One changed path between two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffDelta {
    status: DiffStatus,
    path: String,
    old_oid: Option<Oid>,
    new_oid: Option<Oid>,
    old_mode: Option<FileMode>,
    new_mode: Option<FileMode>,
}

impl DiffDelta {
    fn added(path: String, oid: Oid, mode: FileMode) -> Self {
        DiffDelta {
            status: DiffStatus::Added,
            path,
            old_oid: None,
            new_oid: Some(oid),
            old_mode: None,
            new_mode: Some(mode),
        }
    }

    fn deleted(path: String, oid: Oid, mode: FileMode) -> Self {
        DiffDelta {
            status: DiffStatus::Deleted,
            path,
            old_oid: Some(oid),
            new_oid: None,
            old_mode: Some(mode),
            new_mode: None,
        }
    }

    fn changed(
        status: DiffStatus,
        path: String,
        old_oid: Oid,
        new_oid: Oid,
        old_mode: FileMode,
        new_mode: FileMode,
    ) -> Self {
        DiffDelta {
            status,
            path,
            old_oid: Some(old_oid),
            new_oid: Some(new_oid),
            old_mode: Some(old_mode),
            new_mode: Some(new_mode),
        }
    }

    pub fn status(&self) -> DiffStatus {
        self.status
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn old_oid(&self) -> Option<&Oid> {
        self.old_oid.as_ref()
    }

    pub fn new_oid(&self) -> Option<&Oid> {
        self.new_oid.as_ref()
    }

    pub fn old_mode(&self) -> Option<FileMode> {
        self.old_mode
    }

    pub fn new_mode(&self) -> Option<FileMode> {
        self.new_mode
    }
}

/// Aggregate counts over a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
}

/// The result of comparing two trees: deltas ordered by path.
#[derive(Debug, Clone, Default)]
pub struct TreeDiff {
    deltas: Vec<DiffDelta>,
}

impl TreeDiff {
    pub fn deltas(&self) -> &[DiffDelta] {
        &self.deltas
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffDelta> {
        self.deltas.iter()
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for delta in &self.deltas {
            match delta.status {
                DiffStatus::Added => stats.added += 1,
                DiffStatus::Deleted => stats.deleted += 1,
                DiffStatus::Modified | DiffStatus::ModeChanged => stats.modified += 1,
            }
        }
        stats
    }
}

impl<'a> IntoIterator for &'a TreeDiff {
    type Item = &'a DiffDelta;
    type IntoIter = std::slice::Iter<'a, DiffDelta>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.iter()
    }
}

/// Recursively flattens a tree into `path -> (oid, mode)` for files.
fn flatten_tree(
    store: &LooseObjectStore,
    tree: &Tree,
    prefix: &str,
    out: &mut BTreeMap<String, (Oid, FileMode)>,
) -> Result<()> {
    for entry in tree.entries() {
        let path = if prefix.is_empty() {
            entry.name().to_string()
        } else {
            format!("{}/{}", prefix, entry.name())
        };

        if entry.mode().is_directory() {
            let raw = store.read(entry.oid())?;
            let subtree = Tree::parse(*entry.oid(), &raw)?;
            flatten_tree(store, &subtree, &path, out)?;
        } else {
            out.insert(path, (*entry.oid(), entry.mode()));
        }
    }
    Ok(())
}

/// Compares two trees, treating `None` as the empty tree.
///
/// Deltas come out ordered by path. A path whose kind changes between
/// file and directory shows up as a delete plus adds, the same way the
/// flattened views differ.
pub fn diff_trees(
    store: &LooseObjectStore,
    old: Option<&Tree>,
    new: &Tree,
) -> Result<TreeDiff> {
    let mut old_map = BTreeMap::new();
    if let Some(old) = old {
        flatten_tree(store, old, "", &mut old_map)?;
    }
    let mut new_map = BTreeMap::new();
    flatten_tree(store, new, "", &mut new_map)?;

    let paths: BTreeSet<&String> = old_map.keys().chain(new_map.keys()).collect();

    let mut deltas = Vec::new();
    for path in paths {
        match (old_map.get(path), new_map.get(path)) {
            (None, Some(&(oid, mode))) => {
                deltas.push(DiffDelta::added(path.clone(), oid, mode));
            }
            (Some(&(oid, mode)), None) => {
                deltas.push(DiffDelta::deleted(path.clone(), oid, mode));
            }
            (Some(&(old_oid, old_mode)), Some(&(new_oid, new_mode))) => {
                if old_oid != new_oid {
                    deltas.push(DiffDelta::changed(
                        DiffStatus::Modified,
                        path.clone(),
                        old_oid,
                        new_oid,
                        old_mode,
                        new_mode,
                    ));
                } else if old_mode != new_mode {
                    deltas.push(DiffDelta::changed(
                        DiffStatus::ModeChanged,
                        path.clone(),
                        old_oid,
                        new_oid,
                        old_mode,
                        new_mode,
                    ));
                }
            }
            (None, None) => unreachable!(),
        }
    }

    Ok(TreeDiff { deltas })
}
