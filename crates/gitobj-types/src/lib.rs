//! Foundation types for gitobj.
//!
//! This crate provides the identity and authorship types shared by every
//! other gitobj crate.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Content-addressed identifier (20-byte SHA-1 digest)
//! - [`Signature`] — Author/committer line: identity, Unix time, UTC offset

pub mod error;
pub mod object;
pub mod signature;

pub use error::TypeError;
pub use object::{ObjectId, OBJECT_ID_LEN};
pub use signature::Signature;
