//! MCP `search_conversations` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_conversations` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchConversationsParams {
    /// Substring to look for in message content (case-insensitive).
    #[schemars(description = "Keyword to search for in conversation content")]
    pub query: String,

    /// Maximum number of results. Defaults to 10.
    #[schemars(description = "Maximum number of results (default: 10)")]
    pub limit: Option<usize>,

    /// Number of matches to skip, for paging.
    #[schemars(description = "Number of results to skip (default: 0)")]
    pub skip: Option<usize>,
}
