//! The auto-record gate: persist a message only when its session and role allow it.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::session::SessionConfigStore;
use crate::conversation::ConversationStore;

/// Couples the session registry with a [`ConversationStore`].
#[derive(Clone)]
pub struct AutoRecorder {
    sessions: Arc<SessionConfigStore>,
    store: Arc<dyn ConversationStore>,
}

impl AutoRecorder {
    pub fn new(sessions: Arc<SessionConfigStore>, store: Arc<dyn ConversationStore>) -> Self {
        Self { sessions, store }
    }

    pub fn sessions(&self) -> &Arc<SessionConfigStore> {
        &self.sessions
    }

    /// Record `content` if the gate for (`session_id`, `role`) is open.
    ///
    /// Returns `false` without touching storage when the gate is closed. When
    /// open, `session_id` and `auto_recorded: true` are merged into `metadata`
    /// (overriding caller keys of the same name) before the insert. A storage
    /// failure is logged and reported as `false`.
    pub fn try_auto_record(
        &self,
        role: &str,
        content: &str,
        session_id: &str,
        metadata: Map<String, Value>,
    ) -> bool {
        if !self.sessions.should_record(session_id, role) {
            tracing::debug!(session_id, role, "auto record skipped by session config");
            return false;
        }

        let mut metadata = metadata;
        metadata.insert("session_id".into(), Value::String(session_id.to_string()));
        metadata.insert("auto_recorded".into(), Value::Bool(true));
        let metadata = Value::Object(metadata);

        match self.store.create(role, content, Some(&metadata)) {
            Ok(id) => {
                tracing::info!(
                    id,
                    session_id,
                    role,
                    content_len = content.len(),
                    "auto recorded message"
                );
                true
            }
            Err(e) => {
                tracing::error!(session_id, role, error = %e, "auto record failed");
                false
            }
        }
    }
}
