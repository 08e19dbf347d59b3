use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("not a gitobj repository (or any parent): {0}")]
    NotInitialized(String),

    #[error("repository already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("object {id} is a {actual}, expected {expected}")]
    WrongKind {
        id: gitobj_types::ObjectId,
        expected: gitobj_store::ObjectKind,
        actual: gitobj_store::ObjectKind,
    },

    #[error("store error: {0}")]
    Store(#[from] gitobj_store::StoreError),

    #[error("invalid value: {0}")]
    Type(#[from] gitobj_types::TypeError),

    #[error("invalid config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
