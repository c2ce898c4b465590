//! Named references: branches, tags and the symbolic HEAD.
//!
//! Refs are stored as one file per ref under the metadata directory;
//! a file holds either a hex object id or a `ref: <target>` pointer.
//! Updates go through the object store so a ref can never be left
//! pointing at an id the store does not hold.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::infra::write_file_atomic;
use crate::objects::{LooseObjectStore, Oid};

/// Symbolic ref chains longer than this are treated as cycles.
const MAX_SYMBOLIC_DEPTH: usize = 10;

/// The contents of a single ref file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefValue {
    /// Points directly at an object.
    Direct(Oid),
    /// Points at another ref by full name, e.g. `refs/heads/master`.
    Symbolic(String),
}

/// A ref resolved all the way down to an object id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    /// Full ref name, e.g. `refs/heads/master`.
    pub name: String,
    /// The object id the ref ultimately points at.
    pub oid: Oid,
}

/// Reads and updates refs under a repository metadata directory.
#[derive(Debug, Clone)]
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    pub fn new<P: AsRef<Path>>(git_dir: P) -> Self {
        RefStore {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    /// Reads a single ref file by full name.
    fn read_ref_file(&self, name: &str) -> Result<RefValue> {
        let path = self.git_dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::RefNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let content = content.trim_end();
        if let Some(target) = content.strip_prefix("ref: ") {
            Ok(RefValue::Symbolic(target.trim().to_string()))
        } else {
            let oid = Oid::from_hex(content)
                .map_err(|_| Error::InvalidRefName(name.to_string()))?;
            Ok(RefValue::Direct(oid))
        }
    }

    /// Follows symbolic refs until a direct ref is reached.
    fn resolve_recursive(&self, name: &str, depth: usize) -> Result<ResolvedRef> {
        if depth > MAX_SYMBOLIC_DEPTH {
            return Err(Error::InvalidRefName(format!(
                "symbolic ref loop at {}",
                name
            )));
        }

        match self.read_ref_file(name)? {
            RefValue::Direct(oid) => Ok(ResolvedRef {
                name: name.to_string(),
                oid,
            }),
            RefValue::Symbolic(target) => self.resolve_recursive(&target, depth + 1),
        }
    }

    /// Resolves a ref name to an object id.
    ///
    /// `HEAD` and `refs/...` names are read directly; a short name is
    /// looked up under `refs/heads/` and then `refs/tags/`, so
    /// `master` finds `refs/heads/master` and never collides with
    /// top-level metadata files like `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::RefNotFound` if no candidate exists.
    pub fn resolve(&self, name: &str) -> Result<ResolvedRef> {
        let candidates = if name == "HEAD" || name.starts_with("refs/") {
            vec![name.to_string()]
        } else {
            vec![
                format!("refs/heads/{}", name),
                format!("refs/tags/{}", name),
            ]
        };

        for candidate in &candidates {
            match self.resolve_recursive(candidate, 0) {
                Ok(resolved) => return Ok(resolved),
                Err(Error::RefNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(Error::RefNotFound(name.to_string()))
    }

    /// Returns the branch HEAD points at, or None when detached.
    pub fn current_branch(&self) -> Result<Option<String>> {
        match self.read_ref_file("HEAD")? {
            RefValue::Symbolic(target) => {
                Ok(target.strip_prefix("refs/heads/").map(str::to_string))
            }
            RefValue::Direct(_) => Ok(None),
        }
    }

    /// Lists all branch names, sorted.
    pub fn branches(&self) -> Result<Vec<String>> {
        let heads = self.git_dir.join("refs").join("heads");
        if !heads.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&heads)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Normalizes a ref name to its full form.
    ///
    /// Short names refer to branches; `HEAD` and `refs/...` names pass
    /// through unchanged.
    fn full_name(name: &str) -> String {
        if name == "HEAD" || name.starts_with("refs/") {
            name.to_string()
        } else {
            format!("refs/heads/{}", name)
        }
    }

    /// Points a ref at an object.
    ///
    /// The target must already exist in the store; a dangling update is
    /// rejected and the previous mapping is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingReference` if the store has no object
    /// with the given id.
    pub fn update(&self, name: &str, oid: &Oid, store: &LooseObjectStore) -> Result<()> {
        if !store.exists(oid) {
            return Err(Error::DanglingReference(oid.to_hex()));
        }

        let full = Self::full_name(name);
        let path = self.git_dir.join(&full);
        write_file_atomic(&path, format!("{}\n", oid.to_hex()).as_bytes())?;

        debug!(name = %full, oid = %oid, "updated ref");
        Ok(())
    }

    /// Rewrites HEAD to point at a branch.
    pub fn set_head_symbolic(&self, branch: &str) -> Result<()> {
        let path = self.git_dir.join("HEAD");
        write_file_atomic(&path, format!("ref: refs/heads/{}\n", branch).as_bytes())
    }
}
