use gitcas_types::ObjectId;

/// Errors from object store and codec operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// A record exists but its bytes are not a valid compressed stream.
    #[error("corrupt data for {id}: {reason}")]
    CorruptData { id: ObjectId, reason: String },

    /// Framed bytes failed header, length, kind, or payload validation.
    #[error("malformed object: {0}")]
    MalformedObject(String),

    /// A tree entry cannot be encoded.
    #[error("invalid tree entry {name:?}: {reason}")]
    InvalidTreeEntry { name: String, reason: String },

    /// Stored bytes no longer hash to the id they were stored under.
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
