use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListConversationsParams {
    #[schemars(description = "Number of records to skip (default: 0)")]
    pub skip: Option<usize>,

    #[schemars(description = "Maximum number of records to return (default: 10)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecentConversationsParams {
    #[schemars(description = "Maximum number of records to return, newest first (default: 10)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ConversationIdParams {
    #[schemars(description = "ID of the conversation record")]
    pub conversation_id: i64,
}
