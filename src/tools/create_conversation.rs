use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateConversationParams {
    #[schemars(description = "Speaker role (user, assistant, system)")]
    pub role: String,

    #[schemars(description = "The message content")]
    pub content: String,

    #[schemars(
        description = "Optional metadata as a JSON object string. Non-JSON text is stored under the 'raw' key."
    )]
    pub metadata: Option<String>,
}
