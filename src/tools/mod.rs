pub mod auto_record_conversation;
pub mod auto_recording;
pub mod create_conversation;
pub mod list_conversations;
pub mod request;
pub mod search_conversations;

use auto_record_conversation::AutoRecordConversationParams;
use auto_recording::{EnableAutoRecordingParams, SessionParams};
use create_conversation::CreateConversationParams;
use list_conversations::{ConversationIdParams, ListConversationsParams, RecentConversationsParams};
use request::ToolRequest;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use search_conversations::SearchConversationsParams;

use crate::service::ConversationService;

/// The contextrecord MCP tool handler. Every tool builds a [`ToolRequest`]
/// and hands it to the shared [`ConversationService`].
#[derive(Clone)]
pub struct ContextRecordTools {
    tool_router: ToolRouter<Self>,
    service: ConversationService,
}

impl ContextRecordTools {
    async fn run(&self, request: ToolRequest) -> Result<String, String> {
        let tool = request.tool_name();
        let reply = self.service.execute(request).await.map_err(|e| {
            tracing::warn!(tool, error = %e, "tool call failed");
            e.to_string()
        })?;
        serde_json::to_string_pretty(&reply).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_router]
impl ContextRecordTools {
    pub fn new(service: ConversationService) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
        }
    }

    #[tool(description = "Create a new conversation record. Metadata is an optional JSON object string.")]
    async fn create_conversation(
        &self,
        Parameters(params): Parameters<CreateConversationParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::CreateConversation(params)).await
    }

    #[tool(description = "Record a user message and assistant response. Each message is stored only if auto recording is enabled for the session and its role.")]
    async fn auto_record_conversation(
        &self,
        Parameters(params): Parameters<AutoRecordConversationParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::AutoRecordConversation(params)).await
    }

    #[tool(description = "Enable auto recording for a session, optionally limited to user or assistant messages.")]
    async fn enable_auto_recording(
        &self,
        Parameters(params): Parameters<EnableAutoRecordingParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::EnableAutoRecording(params)).await
    }

    #[tool(description = "Disable auto recording for a session. Role settings are kept.")]
    async fn disable_auto_recording(
        &self,
        Parameters(params): Parameters<SessionParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::DisableAutoRecording(params)).await
    }

    #[tool(description = "Get the auto recording settings of a session.")]
    async fn get_auto_recording_status(
        &self,
        Parameters(params): Parameters<SessionParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::GetAutoRecordingStatus(params)).await
    }

    #[tool(description = "Search conversation content by keyword (case-insensitive substring). Newest first.")]
    async fn search_conversations(
        &self,
        Parameters(params): Parameters<SearchConversationsParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::SearchConversations(params)).await
    }

    #[tool(description = "Get conversation statistics: total count, count per role, records from the last week.")]
    async fn get_conversation_stats(&self) -> Result<String, String> {
        self.run(ToolRequest::GetConversationStats).await
    }

    #[tool(description = "Delete a conversation record by ID.")]
    async fn delete_conversation(
        &self,
        Parameters(params): Parameters<ConversationIdParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::DeleteConversation(params)).await
    }

    #[tool(description = "Get a single conversation record by ID.")]
    async fn get_conversation(
        &self,
        Parameters(params): Parameters<ConversationIdParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::GetConversation(params)).await
    }

    #[tool(description = "List conversation records in insertion order.")]
    async fn list_conversations(
        &self,
        Parameters(params): Parameters<ListConversationsParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::ListConversations(params)).await
    }

    #[tool(description = "Get the most recent conversation records, newest first.")]
    async fn get_recent_conversations(
        &self,
        Parameters(params): Parameters<RecentConversationsParams>,
    ) -> Result<String, String> {
        self.run(ToolRequest::GetRecentConversations(params)).await
    }
}

#[tool_handler]
impl ServerHandler for ContextRecordTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "contextrecord logs conversations. Use enable_auto_recording once per session, \
                 then auto_record_conversation after each exchange. create_conversation stores \
                 a single message; search_conversations and get_recent_conversations read \
                 them back."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
