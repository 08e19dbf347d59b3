//! Content-addressed object storage in git's loose object format.
//!
//! Every blob, tree and commit is framed as `"<kind> <len>\0<payload>"`,
//! identified by the SHA-1 of that framing, zlib-compressed and stored at
//! `objects/<2 hex>/<38 hex>`. The layout is byte-compatible with git.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw file contents
//! - [`Tree`] -- sorted directory listing mapping names to object IDs
//! - [`Commit`] -- tree snapshot with optional parent, signatures and message
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object under a directory
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written; there is no delete path.
//! 2. Writes land in a temp file and are renamed into place.
//! 3. Reads re-hash the decompressed framing and reject mismatches.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod commit;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod reader;
pub mod traits;
pub mod tree;
pub mod worktree;

// Re-export primary types at crate root for ergonomic imports.
pub use commit::{encode_commit, Commit};
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, ObjectKind, StoredObject};
pub use reader::{read_blob, read_commit, read_object, read_tree, read_tree_entries};
pub use traits::ObjectStore;
pub use tree::{parse_tree, EntryMode, Tree, TreeEntry};
pub use worktree::{encode_blob, hash_file, write_tree};
