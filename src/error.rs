//! Error types shared by the storage layer and the service front ends.

/// Failure inside the conversation store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("conversation not found: {0}")]
    NotFound(i64),

    #[error("db lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Failure surfaced by a service operation to the HTTP or MCP caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("db task failed: {0}")]
    Task(String),
}

impl ServiceError {
    /// True when the error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound(_)))
    }
}
