use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Slash commands
// ---------------------------------------------------------------------------

/// Form body of a Slack slash command. Unused fields are ignored.
#[derive(Debug, Deserialize)]
pub struct SlashCommandForm {
    pub token: String,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub text: String,
}

// ---------------------------------------------------------------------------
// Interactive callbacks
// ---------------------------------------------------------------------------

/// Interactive callbacks arrive form-encoded with a single JSON `payload` field.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionPayload {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub token: String,
    pub callback_id: String,
    pub channel: Option<ChannelRef>,
    pub original_message: Option<OriginalMessage>,
    pub message_ts: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionValue>,
    pub submission: Option<KeywordsSubmission>,
}

impl ActionPayload {
    /// Timestamp of the message whose button was clicked.
    pub fn message_ts(&self) -> Option<&str> {
        self.original_message
            .as_ref()
            .map(|m| m.ts.as_str())
            .or(self.message_ts.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct OriginalMessage {
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionValue {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsSubmission {
    /// Absent or null when the optional textarea was left empty.
    pub keywords: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
