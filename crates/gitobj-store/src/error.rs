use gitobj_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// The bytes are not a valid zlib stream.
    #[error("corrupt compressed stream: {0}")]
    CorruptStream(String),

    /// A tree entry name is empty, duplicated, or contains a separator.
    #[error("invalid tree entry name: {0:?}")]
    InvalidEntryName(String),
}

impl StoreError {
    /// Corruption attributed to a specific object.
    pub(crate) fn corrupt(id: ObjectId, reason: impl Into<String>) -> Self {
        Self::CorruptObject {
            id,
            reason: reason.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
