//! Repository facade for gitobj.
//!
//! Owns the metadata directory layout and the loose object store handle, and
//! exposes the plumbing operations the CLI is built from. This is the main
//! entry point for applications embedding gitobj.

pub mod config;
pub mod error;
pub mod repository;

pub use config::RepoConfig;
pub use error::{SdkError, SdkResult};
pub use repository::Repository;

// Re-export key types
pub use gitobj_store::{Blob, Commit, EntryMode, ObjectKind, StoredObject, Tree, TreeEntry};
pub use gitobj_types::{ObjectId, Signature};
