use gitobj_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same kind and payload always
///   produce the same ID, so a second write of an existing ID is a no-op.
/// - There is no delete path; objects are permanent.
/// - The store never interprets payloads. Decoding is the caller's job.
/// - All I/O errors are propagated, never retried or silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Frame, hash and store a payload of the given kind.
    fn put(&self, kind: ObjectKind, payload: Vec<u8>) -> StoreResult<ObjectId> {
        self.write(&StoredObject::new(kind, payload))
    }

    /// Read an object that must exist.
    ///
    /// A missing object is `StoreError::NotFound`, distinct from I/O errors
    /// and corruption.
    fn get(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Read multiple objects in a batch.
    ///
    /// Default implementation calls `read()` for each ID.
    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write multiple objects in a batch and return their IDs.
    ///
    /// Default implementation calls `write()` for each object.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
