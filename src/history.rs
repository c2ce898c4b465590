//! First-parent history walking.
//!
//! A walk starts from the commit a ref resolves to and follows first
//! parents until it reaches a root. Each step yields the commit
//! together with the patch against its first parent; the root commit
//! carries no patch. Objects are loaded lazily, one step per `next`.

use crate::diff::{diff_trees, format_patch};
use crate::error::Result;
use crate::objects::{Commit, LooseObjectStore, Oid, Tree};

/// One step of a history walk.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The commit at this step.
    pub commit: Commit,
    /// Patch against the first parent; `None` for a root commit.
    pub patch: Option<String>,
}

/// Lazy iterator over first-parent history, newest first.
#[derive(Debug)]
pub struct HistoryWalk {
    store: LooseObjectStore,
    next_oid: Option<Oid>,
}

impl HistoryWalk {
    pub(crate) fn new(store: LooseObjectStore, start: Oid) -> Self {
        HistoryWalk {
            store,
            next_oid: Some(start),
        }
    }

    fn load_commit(&self, oid: &Oid) -> Result<Commit> {
        let raw = self.store.read(oid)?;
        Commit::parse(*oid, &raw)
    }

    fn load_tree(&self, oid: &Oid) -> Result<Tree> {
        let raw = self.store.read(oid)?;
        Tree::parse(*oid, &raw)
    }

    fn step(&mut self, oid: Oid) -> Result<HistoryEntry> {
        let commit = self.load_commit(&oid)?;

        let patch = match commit.parent() {
            Some(parent_oid) => {
                let parent = self.load_commit(parent_oid)?;
                let old_tree = self.load_tree(parent.tree())?;
                let new_tree = self.load_tree(commit.tree())?;
                let diff = diff_trees(&self.store, Some(&old_tree), &new_tree)?;
                self.next_oid = Some(*parent_oid);
                Some(format_patch(&self.store, &diff)?)
            }
            None => {
                self.next_oid = None;
                None
            }
        };

        Ok(HistoryEntry { commit, patch })
    }
}

impl Iterator for HistoryWalk {
    type Item = Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.next_oid.take()?;
        let result = self.step(oid);
        // Stop after a failed step rather than retrying it forever
        if result.is_err() {
            self.next_oid = None;
        }
        Some(result)
    }
}
