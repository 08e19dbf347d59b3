use gitobj_crypto::{frame, parse_frame, ObjectHasher};
use gitobj_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot of a tree with optional lineage.
    Commit,
}

impl ObjectKind {
    /// The tag written into the frame header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse a frame tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }

    /// The hasher that frames payloads of this kind.
    pub fn hasher(&self) -> &'static ObjectHasher {
        match self {
            Self::Blob => &ObjectHasher::BLOB,
            Self::Tree => &ObjectHasher::TREE,
            Self::Commit => &ObjectHasher::COMMIT,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored object: kind tag + payload bytes + cached size.
///
/// `StoredObject` is the unit of storage. Stores never interpret the payload;
/// they frame it, hash the frame, and keep the frame keyed by that digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The payload, without the frame header.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    /// The framed form `"<kind> <size>\0<data>"`, which is what gets stored.
    pub fn framed(&self) -> Vec<u8> {
        frame(self.kind.as_str(), &self.data)
    }

    /// Rebuild an object from its framed bytes.
    ///
    /// `id` is the digest the bytes were stored under; it only labels errors.
    pub fn from_framed(id: ObjectId, framed: &[u8]) -> StoreResult<Self> {
        let (tag, payload) = parse_frame(framed).map_err(|e| StoreError::corrupt(id, e.to_string()))?;
        let kind = ObjectKind::from_tag(tag)
            .ok_or_else(|| StoreError::corrupt(id, format!("unknown object kind {tag:?}")))?;
        Ok(Self::new(kind, payload.to_vec()))
    }

    /// Fail with `CorruptObject` unless this object is of `expected` kind.
    pub(crate) fn expect_kind(&self, expected: ObjectKind) -> StoreResult<()> {
        if self.kind != expected {
            return Err(StoreError::corrupt(
                self.compute_id(),
                format!("expected {expected}, got {}", self.kind),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (analogous to git blob).
///
/// Binary-safe: bytes are stored exactly, with no line-ending or text
/// handling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Digest the blob would be stored under, without storing it.
    pub fn hash(data: &[u8]) -> ObjectId {
        ObjectHasher::BLOB.hash(data)
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Consume into a `StoredObject` without copying the bytes.
    pub fn into_stored_object(self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data)
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}
