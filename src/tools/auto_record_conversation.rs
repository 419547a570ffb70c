//! MCP `auto_record_conversation` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `auto_record_conversation` MCP tool.
///
/// Both messages go through the session's auto-recording gate independently.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AutoRecordConversationParams {
    /// What the user said.
    #[schemars(description = "The user's message")]
    pub user_message: String,

    /// What the assistant replied.
    #[schemars(description = "The assistant's response")]
    pub assistant_response: String,

    /// Session whose auto-recording settings apply. Defaults to `"default"`.
    #[schemars(description = "Conversation session ID. Defaults to 'default'.")]
    pub session_id: Option<String>,

    /// Extra context stored with both messages, as a JSON object string.
    #[schemars(description = "Conversation context as a JSON object string")]
    pub context: Option<String>,
}
