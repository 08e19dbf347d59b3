use gitobj_types::ObjectId;
use sha1::{Digest, Sha1};

use crate::frame::frame_header;

/// SHA-1 digest of already-framed bytes.
pub fn digest(framed: &[u8]) -> ObjectId {
    ObjectId::from_hash(Sha1::digest(framed).into())
}

/// Kind-tagged SHA-1 object hasher.
///
/// Each hasher carries the kind tag (`"blob"`, `"tree"`, `"commit"`) that is
/// written into the frame header before the payload. Two payloads with
/// identical bytes but different kinds therefore never share a digest.
pub struct ObjectHasher {
    kind: &'static str,
}

impl ObjectHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { kind: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { kind: "tree" };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self { kind: "commit" };

    /// Create a hasher with a custom kind tag.
    pub const fn new(kind: &'static str) -> Self {
        Self { kind }
    }

    /// Digest of the framed payload, streamed so the frame is never copied.
    pub fn hash(&self, payload: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(frame_header(self.kind, payload.len()));
        hasher.update(payload);
        ObjectId::from_hash(hasher.finalize().into())
    }

    /// Verify that a payload produces the expected object ID.
    pub fn verify(&self, payload: &[u8], expected: &ObjectId) -> bool {
        self.hash(payload) == *expected
    }

    /// The kind tag used by this hasher.
    pub fn kind(&self) -> &str {
        self.kind
    }
}
