//! Digest and framing primitives for gitobj.
//!
//! Every object is hashed in its framed form, `"<kind> <length>\0<payload>"`,
//! using SHA-1. The framing helpers here are shared by writers (which hash and
//! store the frame) and readers (which split a decompressed frame back apart).

pub mod frame;
pub mod hasher;

pub use frame::{frame, frame_header, parse_frame, FrameError};
pub use hasher::{digest, ObjectHasher};
