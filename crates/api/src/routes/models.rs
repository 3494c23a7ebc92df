use chrono::{DateTime, Utc};
use lobby_room::{ChatMessage, Participant};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub name: String,
    pub last_seen: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            name: participant.name,
            last_seen: participant.last_seen,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub from: String,
    pub to: String,
    pub text: String,
    /// One of `message`, `private_message` or `status`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display time, `HH:MM:SS` UTC.
    pub time: String,
}

impl From<ChatMessage> for MessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            from: message.from,
            to: message.to,
            text: message.text,
            kind: message.kind.as_str().to_string(),
            time: message.time,
        }
    }
}

/// Body of `POST /participants`.
///
/// Fields are kept as raw JSON and checked one by one by the handler.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    #[serde(default)]
    #[schema(value_type = String)]
    pub name: Option<Value>,
}

/// Body of `POST /messages`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    #[serde(default)]
    #[schema(value_type = String)]
    pub to: Option<Value>,
    #[serde(default)]
    #[schema(value_type = String)]
    pub text: Option<Value>,
    /// `message` or `private_message`.
    #[serde(default, rename = "type")]
    #[schema(value_type = String)]
    pub kind: Option<Value>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessagesQuery {
    /// Return only the most recent `limit` visible messages.
    pub limit: Option<usize>,
}
