//! Parameters for the auto-recording switch tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for `enable_auto_recording`.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct EnableAutoRecordingParams {
    #[schemars(description = "Session ID to enable auto recording for. Defaults to 'default'.")]
    pub session_id: Option<String>,

    #[schemars(description = "Record user messages (default: true)")]
    pub record_user: Option<bool>,

    #[schemars(description = "Record assistant responses (default: true)")]
    pub record_assistant: Option<bool>,
}

/// Parameters for `disable_auto_recording` and `get_auto_recording_status`.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SessionParams {
    #[schemars(description = "Session ID. Defaults to 'default'.")]
    pub session_id: Option<String>,
}
