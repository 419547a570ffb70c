//! Closed set of tool invocations.
//!
//! A tool call arrives as a name plus a JSON argument object. [`ToolRequest::parse`]
//! turns it into a typed variant, rejecting unknown names and malformed
//! arguments before anything reaches the service.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::auto_record_conversation::AutoRecordConversationParams;
use super::auto_recording::{EnableAutoRecordingParams, SessionParams};
use super::create_conversation::CreateConversationParams;
use super::list_conversations::{
    ConversationIdParams, ListConversationsParams, RecentConversationsParams,
};
use super::search_conversations::SearchConversationsParams;
use crate::error::ServiceError;

/// Name and description of every tool, in listing order.
pub const TOOL_CATALOG: &[(&str, &str)] = &[
    ("create_conversation", "Create a new conversation record"),
    (
        "auto_record_conversation",
        "Record a user message and assistant response per the session's auto-recording settings",
    ),
    ("enable_auto_recording", "Enable auto recording for a session"),
    ("disable_auto_recording", "Disable auto recording for a session"),
    ("get_auto_recording_status", "Get the auto recording settings of a session"),
    ("search_conversations", "Search conversation records by keyword"),
    ("get_conversation_stats", "Get conversation statistics"),
    ("delete_conversation", "Delete a conversation record by ID"),
    ("get_conversation", "Get a single conversation record by ID"),
    ("list_conversations", "List conversation records in insertion order"),
    ("get_recent_conversations", "Get the most recent conversation records"),
];

#[derive(Debug, thiserror::Error)]
pub enum ToolRequestError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid parameters for {tool}: {source}")]
    InvalidParameters {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ToolRequestError> for ServiceError {
    fn from(err: ToolRequestError) -> Self {
        match err {
            ToolRequestError::UnknownTool(name) => ServiceError::UnknownTool(name),
            invalid @ ToolRequestError::InvalidParameters { .. } => {
                ServiceError::InvalidInput(invalid.to_string())
            }
        }
    }
}

#[derive(Debug)]
pub enum ToolRequest {
    CreateConversation(CreateConversationParams),
    AutoRecordConversation(AutoRecordConversationParams),
    EnableAutoRecording(EnableAutoRecordingParams),
    DisableAutoRecording(SessionParams),
    GetAutoRecordingStatus(SessionParams),
    SearchConversations(SearchConversationsParams),
    GetConversationStats,
    DeleteConversation(ConversationIdParams),
    GetConversation(ConversationIdParams),
    ListConversations(ListConversationsParams),
    GetRecentConversations(RecentConversationsParams),
}

impl ToolRequest {
    /// Build a request from a tool name and its arguments. `null` arguments
    /// count as an empty object.
    pub fn parse(tool_name: &str, parameters: Value) -> Result<Self, ToolRequestError> {
        let parameters = match parameters {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        fn params<T: DeserializeOwned>(tool: &str, value: Value) -> Result<T, ToolRequestError> {
            serde_json::from_value(value).map_err(|source| ToolRequestError::InvalidParameters {
                tool: tool.to_string(),
                source,
            })
        }

        let request = match tool_name {
            "create_conversation" => Self::CreateConversation(params(tool_name, parameters)?),
            "auto_record_conversation" => {
                Self::AutoRecordConversation(params(tool_name, parameters)?)
            }
            "enable_auto_recording" => Self::EnableAutoRecording(params(tool_name, parameters)?),
            "disable_auto_recording" => Self::DisableAutoRecording(params(tool_name, parameters)?),
            "get_auto_recording_status" => {
                Self::GetAutoRecordingStatus(params(tool_name, parameters)?)
            }
            "search_conversations" => Self::SearchConversations(params(tool_name, parameters)?),
            "get_conversation_stats" => Self::GetConversationStats,
            "delete_conversation" => Self::DeleteConversation(params(tool_name, parameters)?),
            "get_conversation" => Self::GetConversation(params(tool_name, parameters)?),
            "list_conversations" => Self::ListConversations(params(tool_name, parameters)?),
            "get_recent_conversations" => {
                Self::GetRecentConversations(params(tool_name, parameters)?)
            }
            other => return Err(ToolRequestError::UnknownTool(other.to_string())),
        };
        Ok(request)
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::CreateConversation(_) => "create_conversation",
            Self::AutoRecordConversation(_) => "auto_record_conversation",
            Self::EnableAutoRecording(_) => "enable_auto_recording",
            Self::DisableAutoRecording(_) => "disable_auto_recording",
            Self::GetAutoRecordingStatus(_) => "get_auto_recording_status",
            Self::SearchConversations(_) => "search_conversations",
            Self::GetConversationStats => "get_conversation_stats",
            Self::DeleteConversation(_) => "delete_conversation",
            Self::GetConversation(_) => "get_conversation",
            Self::ListConversations(_) => "list_conversations",
            Self::GetRecentConversations(_) => "get_recent_conversations",
        }
    }
}
