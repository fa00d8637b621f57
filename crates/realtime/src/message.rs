use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A full frame received or sent over the websocket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeMessage {
    pub topic: String,
    pub event: ChannelEvent,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub message_ref: Value,
}

impl RealtimeMessage {
    /// The message ref as a string, when the server echoed one
    pub fn ref_str(&self) -> Option<&str> {
        self.message_ref.as_str()
    }
}

/// Channel events, Phoenix control events included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelEvent {
    PostgresChanges,

    #[serde(rename = "phx_join")]
    PhoenixJoin,
    #[serde(rename = "phx_reply")]
    PhoenixReply,
    #[serde(rename = "phx_error")]
    PhoenixError,
    #[serde(rename = "phx_close")]
    PhoenixClose,
    #[serde(rename = "phx_leave")]
    PhoenixLeave,

    Heartbeat,
    System,
    PresenceState,
    PresenceDiff,
    Broadcast,

    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ChannelEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PostgresChanges => "postgres_changes",
            Self::PhoenixJoin => "phx_join",
            Self::PhoenixReply => "phx_reply",
            Self::PhoenixError => "phx_error",
            Self::PhoenixClose => "phx_close",
            Self::PhoenixLeave => "phx_leave",
            Self::Heartbeat => "heartbeat",
            Self::System => "system",
            Self::PresenceState => "presence_state",
            Self::PresenceDiff => "presence_diff",
            Self::Broadcast => "broadcast",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Kind of row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

/// One row change delivered on a `postgres_changes` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostgresChange {
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub commit_timestamp: Option<String>,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// New row image for inserts and updates
    #[serde(default)]
    pub record: Option<Value>,
    /// Old row image; for deletes this carries at least the primary key
    #[serde(default)]
    pub old_record: Option<Value>,
}

impl PostgresChange {
    /// Decode the payload of a `postgres_changes` frame. The server wraps
    /// the change in `{"ids": [...], "data": {...}}`.
    pub fn from_payload(payload: &Value) -> Result<Self, serde_json::Error> {
        let data = payload.get("data").unwrap_or(payload);
        PostgresChange::deserialize(data)
    }

    /// Primary key of the affected row, read from the new image and then the old one
    pub fn row_id(&self) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.get("id"))
            .or_else(|| self.old_record.as_ref().and_then(|r| r.get("id")))
            .and_then(Value::as_str)
    }
}
