//! Repository lifecycle and high-level operations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::diff::{diff_trees, format_patch, TreeDiff};
use crate::error::{Error, Result};
use crate::history::HistoryWalk;
use crate::infra::write_file_atomic;
use crate::objects::{
    Blob, Commit, LooseObjectStore, Object, ObjectType, Oid, Signature, Tree, TreeBuilder,
};
use crate::refs::RefStore;

/// The branch a fresh repository starts on.
pub const DEFAULT_BRANCH: &str = "master";

/// An opened repository: a working directory plus its metadata directory.
#[derive(Debug, Clone)]
pub struct Repository {
    work_dir: PathBuf,
    git_dir: PathBuf,
}

/// Checks that a directory has the shape of a metadata directory.
fn is_git_dir(path: &Path) -> bool {
    path.join("HEAD").is_file()
        && path.join("objects").is_dir()
        && path.join("refs").is_dir()
}

impl Repository {
    /// Initializes a new repository at the given directory.
    ///
    /// Creates the directory (and parents) if needed, then lays out the
    /// `.git` structure with HEAD pointing at the default branch. The
    /// branch ref itself does not exist until the first commit.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyARepository` if a repository is already
    /// present there.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let work_dir = path.as_ref().to_path_buf();
        let git_dir = work_dir.join(".git");

        if is_git_dir(&git_dir) {
            return Err(Error::AlreadyARepository(work_dir));
        }

        fs::create_dir_all(git_dir.join("objects"))?;
        fs::create_dir_all(git_dir.join("refs").join("heads"))?;
        fs::create_dir_all(git_dir.join("refs").join("tags"))?;

        RefStore::new(&git_dir).set_head_symbolic(DEFAULT_BRANCH)?;
        write_file_atomic(
            &git_dir.join("config"),
            b"[core]\n\trepositoryformatversion = 0\n\tbare = false\n",
        )?;

        info!(path = %work_dir.display(), "initialized repository");

        Ok(Repository { work_dir, git_dir })
    }

    /// Opens an existing repository.
    ///
    /// Accepts either the working directory or its `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotARepository` if no valid metadata directory
    /// is found at the path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let git_dir = if is_git_dir(path) {
            path.to_path_buf()
        } else if is_git_dir(&path.join(".git")) {
            path.join(".git")
        } else {
            return Err(Error::NotARepository(path.to_path_buf()));
        };

        let work_dir = git_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| git_dir.clone());

        debug!(path = %git_dir.display(), "opened repository");

        Ok(Repository { work_dir, git_dir })
    }

    /// Searches upward from the given directory for a repository.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let start = path.as_ref();
        let mut current = Some(start);

        while let Some(dir) = current {
            if is_git_dir(&dir.join(".git")) {
                return Self::open(dir);
            }
            current = dir.parent();
        }

        Err(Error::NotARepository(start.to_path_buf()))
    }

    /// The working directory.
    pub fn path(&self) -> &Path {
        &self.work_dir
    }

    /// The metadata directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The object store for this repository.
    pub fn objects(&self) -> LooseObjectStore {
        LooseObjectStore::new(self.git_dir.join("objects"))
    }

    /// The ref store for this repository.
    pub fn refs(&self) -> RefStore {
        RefStore::new(&self.git_dir)
    }

    /// The repository configuration.
    pub fn config(&self) -> Result<Config> {
        Config::open(self.git_dir.join("config"))
    }

    /// Builds a signature from the configured identity.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingIdentity` unless both `user.name` and
    /// `user.email` are configured.
    pub fn signature(&self) -> Result<Signature> {
        let config = self.config()?;
        match (config.get("user", "name"), config.get("user", "email")) {
            (Some(name), Some(email)) => Ok(Signature::now(name, email)),
            _ => Err(Error::MissingIdentity),
        }
    }

    /// Resolves a full or abbreviated hex id to a unique object.
    pub fn resolve_oid(&self, hex: &str) -> Result<Oid> {
        if hex.len() == crate::objects::OID_HEX_LEN {
            return Oid::from_hex(hex);
        }

        let matches = self.objects().find_by_prefix(hex)?;
        match matches.len() {
            0 => Err(Error::ObjectNotFound(hex.to_string())),
            1 => Ok(matches[0]),
            _ => Err(Error::InvalidOid(format!("ambiguous prefix: {}", hex))),
        }
    }

    /// Loads any object by full or abbreviated hex id.
    pub fn object(&self, hex: &str) -> Result<Object> {
        let oid = self.resolve_oid(hex)?;
        let raw = self.objects().read(&oid)?;
        Ok(match raw.object_type {
            ObjectType::Blob => Object::Blob(Blob::parse(raw)?),
            ObjectType::Tree => Object::Tree(Tree::parse(oid, &raw)?),
            ObjectType::Commit => Object::Commit(Commit::parse(oid, &raw)?),
        })
    }

    /// Loads a commit by id.
    pub fn find_commit(&self, oid: &Oid) -> Result<Commit> {
        let raw = self.objects().read(oid)?;
        Commit::parse(*oid, &raw)
    }

    /// Loads a tree by id.
    pub fn find_tree(&self, oid: &Oid) -> Result<Tree> {
        let raw = self.objects().read(oid)?;
        Tree::parse(*oid, &raw)
    }

    /// Loads a blob by id.
    pub fn find_blob(&self, oid: &Oid) -> Result<Blob> {
        let raw = self.objects().read(oid)?;
        Blob::parse(raw)
    }

    /// Creates a commit object pointing at a tree.
    ///
    /// The tree and every parent must already be in the object store;
    /// nothing is written when validation fails. No ref moves.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingReference` if the tree or a parent is
    /// missing from the store.
    pub fn create_commit(
        &self,
        tree: &Oid,
        parents: &[Oid],
        author: &Signature,
        committer: &Signature,
        message: &str,
    ) -> Result<Oid> {
        let store = self.objects();

        if !store.exists(tree) {
            return Err(Error::DanglingReference(tree.to_hex()));
        }
        for parent in parents {
            if !store.exists(parent) {
                return Err(Error::DanglingReference(parent.to_hex()));
            }
        }

        let oid = Commit::write(&store, tree, parents, author, committer, message)?;
        debug!(oid = %oid, parents = parents.len(), "created commit");
        Ok(oid)
    }

    /// Creates the first commit on the default branch.
    ///
    /// Mirrors the usual bootstrap: an empty tree, no parents, the
    /// configured identity and the message "Initial commit". The
    /// branch ref is written only after the commit exists.
    pub fn create_initial_commit(&self) -> Result<Oid> {
        let signature = self.signature()?;
        let store = self.objects();

        let tree = TreeBuilder::new().build(&store)?;
        let oid = self.create_commit(&tree, &[], &signature, &signature, "Initial commit")?;

        self.update_head(&oid)?;

        info!(oid = %oid, "created initial commit");
        Ok(oid)
    }

    /// Points the current branch (or HEAD itself when detached) at a commit.
    pub fn update_head(&self, oid: &Oid) -> Result<()> {
        let refs = self.refs();
        match refs.current_branch()? {
            Some(branch) => refs.update(&branch, oid, &self.objects()),
            None => refs.update("HEAD", oid, &self.objects()),
        }
    }

    /// Walks first-parent history starting from a ref.
    ///
    /// The ref is resolved when the walk is created, so a later ref
    /// update does not affect a walk already in progress.
    ///
    /// # Errors
    ///
    /// Returns `Error::RefNotFound` if the ref does not resolve.
    pub fn walk_history(&self, ref_name: &str) -> Result<HistoryWalk> {
        let resolved = self.refs().resolve(ref_name)?;
        Ok(HistoryWalk::new(self.objects(), resolved.oid))
    }

    /// Diffs two trees; `None` stands for the empty tree.
    pub fn diff_trees(&self, old: Option<&Tree>, new: &Tree) -> Result<TreeDiff> {
        diff_trees(&self.objects(), old, new)
    }

    /// Diffs a commit against its first parent.
    ///
    /// A root commit is diffed against the empty tree, so every file
    /// shows as added.
    pub fn commit_diff(&self, commit: &Commit) -> Result<TreeDiff> {
        let new_tree = self.find_tree(commit.tree())?;

        let old_tree = match commit.parent() {
            Some(parent_oid) => {
                let parent = self.find_commit(parent_oid)?;
                Some(self.find_tree(parent.tree())?)
            }
            None => None,
        };

        diff_trees(&self.objects(), old_tree.as_ref(), &new_tree)
    }

    /// Renders a diff as patch text.
    pub fn format_patch(&self, diff: &TreeDiff) -> Result<String> {
        format_patch(&self.objects(), diff)
    }
}
