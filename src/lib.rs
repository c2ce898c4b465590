//! A content-addressed object store and commit-history engine,
//! Git-compatible on disk.
//!
//! Objects (blobs, trees, commits) are stored as zlib-compressed loose
//! files keyed by the SHA-1 of their content, so storing the same bytes
//! twice is a no-op and every object id is verifiable. On top of the
//! store sit named refs, tree-to-tree diffing with unified patch
//! output, and a lazy first-parent history walk.
//!
//! # Quick start
//!
//! ```no_run
//! use minigit::Repository;
//!
//! fn main() -> minigit::Result<()> {
//!     let repo = Repository::open(".")?;
//!
//!     for entry in repo.walk_history("master")? {
//!         let entry = entry?;
//!         println!("{} {}", entry.commit.oid().short(), entry.commit.summary());
//!         if let Some(patch) = &entry.patch {
//!             print!("{}", patch);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`objects`]: ids, blobs, trees, commits and the loose object store
//! - [`refs`]: branches, tags and the symbolic HEAD
//! - [`diff`]: tree comparison and patch rendering
//! - [`history`]: first-parent history walking
//! - [`repository`]: lifecycle and high-level operations
//! - [`config`]: repository configuration

pub mod config;
pub mod diff;
pub mod error;
pub mod history;
pub mod objects;
pub mod refs;
pub mod repository;

pub(crate) mod infra;

pub use config::Config;
pub use diff::{DiffDelta, DiffStats, DiffStatus, TreeDiff};
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryWalk};
pub use objects::{
    Blob, Commit, FileMode, Object, Oid, Signature, Tree, TreeBuilder, TreeEntry,
};
pub use refs::{RefStore, RefValue, ResolvedRef};
pub use repository::{Repository, DEFAULT_BRANCH};
