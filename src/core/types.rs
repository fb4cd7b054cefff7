use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One slash command invocation, as handed from the receiver to the processor.
#[derive(Deserialize, Serialize, Clone)]
pub struct InboundCommand {
    pub channel_id: String,
    pub channel_name: String,
    pub response_url: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    /// Bearer credential for the management API, attached by the auth layer.
    #[serde(default)]
    pub credential: Option<String>,
    /// Requesting user's offset from UTC in seconds, when the auth layer knows it.
    #[serde(default)]
    pub tz_offset: Option<i32>,
}

impl std::fmt::Debug for InboundCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundCommand")
            .field("channel_id", &self.channel_id)
            .field("channel_name", &self.channel_name)
            .field("response_url", &self.response_url)
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("text", &self.text)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("tz_offset", &self.tz_offset)
            .finish()
    }
}

/// Body of a queue message: one acknowledged command waiting for dispatch.
#[derive(Debug, Deserialize, Serialize)]
pub struct QueuedCommand {
    pub command: InboundCommand,
    pub received_at: DateTime<Utc>,
}

/// Request-scoped context passed by reference to every downstream call.
#[derive(Clone)]
pub struct CommandMeta {
    pub channel_id: String,
    pub channel_name: String,
    pub reply_url: String,
    pub credential: Option<String>,
    pub user_name: String,
    pub timezone: FixedOffset,
}

impl CommandMeta {
    pub fn from_inbound(command: &InboundCommand, fallback_tz: FixedOffset) -> Self {
        let timezone = command
            .tz_offset
            .and_then(FixedOffset::east_opt)
            .unwrap_or(fallback_tz);

        Self {
            channel_id: command.channel_id.clone(),
            channel_name: command.channel_name.clone(),
            reply_url: command.response_url.clone(),
            credential: command.credential.clone(),
            user_name: command.user_name.clone(),
            timezone,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppRecord {
    pub name: String,
    #[serde(default, deserialize_with = "truthy")]
    pub preview: bool,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormationRecord {
    #[serde(rename = "type")]
    pub process_type: String,
    pub quantity: u32,
    pub size: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DynoRecord {
    #[serde(rename = "type")]
    pub process_type: String,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDyno {
    pub dyno_name: String,
    pub display_state: String,
    pub warning: bool,
    pub updated_at_local: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MembershipRecord {
    pub channel_id: String,
    pub is_member: bool,
    pub updated_at: DateTime<Utc>,
}

// The platform reports `preview` as either a flag or an object describing
// the preview source; any non-empty value counts as a preview app.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(_) => true,
    })
}
