//! Per-session auto-recording configuration.
//!
//! Entries live in memory for the lifetime of the process. A session that was
//! never configured reads as [`SessionRecordingConfig::default`] (disabled,
//! both roles allowed) without being inserted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Auto-recording settings for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecordingConfig {
    pub enabled: bool,
    pub record_user: bool,
    pub record_assistant: bool,
}

impl Default for SessionRecordingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            record_user: true,
            record_assistant: true,
        }
    }
}

impl SessionRecordingConfig {
    /// Whether a message from `role` passes under this config.
    ///
    /// Roles other than `user` and `assistant` pass whenever recording is enabled.
    pub fn allows(&self, role: &str) -> bool {
        if !self.enabled {
            return false;
        }
        match role {
            "user" => self.record_user,
            "assistant" => self.record_assistant,
            _ => true,
        }
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RecordingConfigUpdate {
    pub enabled: Option<bool>,
    pub record_user: Option<bool>,
    pub record_assistant: Option<bool>,
}

impl RecordingConfigUpdate {
    fn apply(&self, config: &mut SessionRecordingConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(record_user) = self.record_user {
            config.record_user = record_user;
        }
        if let Some(record_assistant) = self.record_assistant {
            config.record_assistant = record_assistant;
        }
    }
}

/// Registry of session configs behind a single mutex.
#[derive(Debug, Default)]
pub struct SessionConfigStore {
    sessions: Mutex<HashMap<String, SessionRecordingConfig>>,
}

impl SessionConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Updates are plain field writes, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionRecordingConfig>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_config(&self, session_id: &str) -> SessionRecordingConfig {
        self.lock().get(session_id).copied().unwrap_or_default()
    }

    /// Create the entry with defaults if absent, then apply `update`.
    /// Returns the resulting config.
    pub fn set_config(
        &self,
        session_id: &str,
        update: RecordingConfigUpdate,
    ) -> SessionRecordingConfig {
        let mut sessions = self.lock();
        let config = sessions.entry(session_id.to_string()).or_default();
        update.apply(config);
        *config
    }

    pub fn enable(
        &self,
        session_id: &str,
        record_user: bool,
        record_assistant: bool,
    ) -> SessionRecordingConfig {
        let config = self.set_config(
            session_id,
            RecordingConfigUpdate {
                enabled: Some(true),
                record_user: Some(record_user),
                record_assistant: Some(record_assistant),
            },
        );
        tracing::info!(
            session_id,
            record_user,
            record_assistant,
            "auto recording enabled"
        );
        config
    }

    /// Turn recording off; role flags are left as they were.
    pub fn disable(&self, session_id: &str) -> SessionRecordingConfig {
        let config = self.set_config(
            session_id,
            RecordingConfigUpdate {
                enabled: Some(false),
                ..Default::default()
            },
        );
        tracing::info!(session_id, "auto recording disabled");
        config
    }

    pub fn should_record(&self, session_id: &str, role: &str) -> bool {
        self.get_config(session_id).allows(role)
    }

    /// Snapshot of every configured session, sorted by id.
    pub fn sessions(&self) -> Vec<(String, SessionRecordingConfig)> {
        let mut all: Vec<_> = self
            .lock()
            .iter()
            .map(|(id, config)| (id.clone(), *config))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}
