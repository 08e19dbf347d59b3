//! Encoding files and directories from disk into blobs and trees.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;

use gitobj_types::ObjectId;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, ObjectKind};
use crate::traits::ObjectStore;
use crate::tree::{EntryMode, Tree, TreeEntry};

/// Store `bytes` as a blob.
pub fn encode_blob<S: ObjectStore + ?Sized>(store: &S, bytes: Vec<u8>) -> StoreResult<ObjectId> {
    store.put(ObjectKind::Blob, bytes)
}

/// Read a file and store its exact contents as a blob.
pub fn hash_file<S: ObjectStore + ?Sized>(store: &S, path: &Path) -> StoreResult<ObjectId> {
    let bytes = fs::read(path)?;
    encode_blob(store, bytes)
}

/// Recursively store `dir` as a tree and return the root tree's ID.
///
/// Children named `skip` are ignored at every level, which keeps the
/// metadata directory out of its own snapshot. Subdirectories become
/// [`EntryMode::Directory`] entries; everything else is read as a regular
/// file. The tree is only written once every child has been stored, so an
/// I/O error leaves no tree object behind. `dir` must be a directory.
pub fn write_tree<S: ObjectStore + ?Sized>(
    store: &S,
    dir: &Path,
    skip: &str,
) -> StoreResult<ObjectId> {
    let tree = build_tree(store, dir, skip)?;
    let id = store.write(&tree.to_stored_object()?)?;
    debug!(%id, dir = %dir.display(), entries = tree.len(), "wrote tree");
    Ok(id)
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    name.to_string_lossy().into_owned().into_bytes()
}

fn build_tree<S: ObjectStore + ?Sized>(store: &S, dir: &Path, skip: &str) -> StoreResult<Tree> {
    if !fs::metadata(dir)?.is_dir() {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let mut entries = Vec::new();
    for child in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let child = child.map_err(io::Error::from)?;
        let name = name_bytes(child.file_name());
        if name == skip.as_bytes() {
            trace!(path = %child.path().display(), "skipping metadata directory");
            continue;
        }

        let entry = if child.file_type().is_dir() {
            TreeEntry::new(EntryMode::Directory, name, write_tree(store, child.path(), skip)?)
        } else {
            TreeEntry::new(EntryMode::Regular, name, hash_file(store, child.path())?)
        };
        trace!(mode = %entry.mode, name = %entry.display_name(), id = %entry.object_id, "tree entry");
        entries.push(entry);
    }
    Ok(Tree::new(entries))
}
