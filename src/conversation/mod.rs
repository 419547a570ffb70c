pub mod search;
pub mod stats;
pub mod store;
pub mod types;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Persistence seam consumed by the auto-record gate.
///
/// Methods are synchronous; callers in async contexts should use
/// `tokio::task::spawn_blocking`.
pub trait ConversationStore: Send + Sync {
    /// Persist one chat turn and return its assigned id.
    fn create(
        &self,
        role: &str,
        content: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<i64, StorageError>;
}

/// [`ConversationStore`] backed by the shared SQLite connection.
#[derive(Clone)]
pub struct SqliteConversationStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteConversationStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

impl ConversationStore for SqliteConversationStore {
    fn create(
        &self,
        role: &str,
        content: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<i64, StorageError> {
        let mut conn = self
            .db
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        store::create_conversation(&mut conn, role, content, metadata).map(|record| record.id)
    }
}
