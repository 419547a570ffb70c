//! Conversation record type and metadata helpers.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One recorded chat turn, matching the `conversations` table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Row id assigned by SQLite; increases with every insert.
    pub id: i64,
    /// RFC 3339 UTC creation timestamp.
    pub timestamp: String,
    /// Speaker role (`"user"`, `"assistant"`, `"system"`, ...). Not validated.
    pub role: String,
    pub content: String,
    pub metadata: Option<Value>,
}

/// Current time in the fixed format stored in `conversations.timestamp`.
///
/// Microsecond precision with a `Z` suffix keeps lexical order equal to time order.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse caller-supplied metadata text.
///
/// A JSON object is returned as-is. Empty input yields `None`. Anything else
/// (invalid JSON, or JSON that is not an object) is kept under `{"raw": ...}`
/// so the message is still recorded.
pub fn parse_metadata(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => {
            tracing::debug!(len = raw.len(), "metadata is not a JSON object, wrapping as raw");
            let mut wrapped = Map::new();
            wrapped.insert("raw".into(), Value::String(raw.to_string()));
            Some(Value::Object(wrapped))
        }
    }
}
