//! Object model: ids, blobs, trees, commits and the loose object store.

pub mod blob;
pub mod commit;
pub mod oid;
pub mod store;
pub mod tree;

pub use blob::Blob;
pub use commit::{Commit, Signature};
pub use oid::{Oid, OID_BYTES, OID_HEX_LEN};
pub use store::{LooseObjectStore, ObjectType, RawObject};
pub use tree::{FileMode, Tree, TreeBuilder, TreeEntry};

/// Any parsed object.
#[derive(Debug, Clone)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// Returns the type of the object.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Blob(_) => ObjectType::Blob,
            Object::Tree(_) => ObjectType::Tree,
            Object::Commit(_) => ObjectType::Commit,
        }
    }
}
