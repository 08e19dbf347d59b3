//! Typed reads on top of [`ObjectStore::get`].

use gitobj_types::ObjectId;

use crate::commit::Commit;
use crate::error::StoreResult;
use crate::object::{Blob, StoredObject};
use crate::traits::ObjectStore;
use crate::tree::{Tree, TreeEntry};

/// Fetch an object's kind and payload. Missing objects are `NotFound`.
pub fn read_object<S: ObjectStore + ?Sized>(store: &S, id: &ObjectId) -> StoreResult<StoredObject> {
    store.get(id)
}

/// Fetch a blob's bytes.
pub fn read_blob<S: ObjectStore + ?Sized>(store: &S, id: &ObjectId) -> StoreResult<Blob> {
    Blob::from_stored_object(&store.get(id)?)
}

/// Fetch and decode a tree.
pub fn read_tree<S: ObjectStore + ?Sized>(store: &S, id: &ObjectId) -> StoreResult<Tree> {
    Tree::from_stored_object(&store.get(id)?)
}

/// Fetch a tree's entries in stored order.
pub fn read_tree_entries<S: ObjectStore + ?Sized>(
    store: &S,
    id: &ObjectId,
) -> StoreResult<Vec<TreeEntry>> {
    read_tree(store, id).map(|tree| tree.entries)
}

/// Fetch and decode a commit.
pub fn read_commit<S: ObjectStore + ?Sized>(store: &S, id: &ObjectId) -> StoreResult<Commit> {
    Commit::from_stored_object(&store.get(id)?)
}
