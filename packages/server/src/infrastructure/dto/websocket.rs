//! WebSocket message DTOs.
//!
//! ## Inbound
//!
//! Every text frame is a JSON object with a string `type`. The server stamps
//! `senderId` with the authenticated user id before anything else sees the
//! frame. Recognized debate frames decode into [`DebateCommand`]; other typed
//! frames are relayed untouched.
//!
//! ## Outbound
//!
//! [`ServerMessage`] is the closed set of envelopes the server itself emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{DebateStatus, DebateType, ParticipantRole, Side, UserId};

/// Key the server overwrites on every inbound frame.
pub const SENDER_ID_KEY: &str = "senderId";

/// Malformed inbound frame. The frame is dropped, the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("binary frames are not supported")]
    Binary,
}

/// A validated inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    /// Value of the `type` field
    pub message_type: String,
    /// The full object, `senderId` included
    pub body: Value,
}

impl InboundFrame {
    /// Parse a text frame and stamp it with the sender's id.
    pub fn parse(text: &str, sender: &UserId) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::NotAnObject);
        };
        let message_type = match object.get("type") {
            Some(Value::String(message_type)) => message_type.clone(),
            _ => return Err(ProtocolError::MissingType),
        };
        object.insert(
            SENDER_ID_KEY.to_string(),
            Value::String(sender.as_str().to_string()),
        );

        Ok(Self {
            message_type,
            body: Value::Object(object),
        })
    }

    /// Serialized form relayed to the rest of the room.
    pub fn to_payload(&self) -> String {
        self.body.to_string()
    }
}

/// Recognized debate-room commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum DebateCommand {
    #[serde(rename = "debate:join_room")]
    JoinRoom {
        /// Optional side to pick while joining
        #[serde(default)]
        side: Option<String>,
    },

    #[serde(rename = "debate:leave_room")]
    LeaveRoom,

    #[serde(rename = "debate:self_mute_change")]
    SelfMuteChange {
        #[serde(rename = "isSelfMuted")]
        is_self_muted: bool,
    },

    #[serde(rename = "debate:mute_change")]
    MuteChange {
        #[serde(rename = "targetUserId")]
        target_user_id: String,
        #[serde(rename = "isMutedByHost")]
        is_muted_by_host: bool,
    },
}

impl DebateCommand {
    /// Wire names of every recognized command, for handler registration.
    pub const MESSAGE_TYPES: [&'static str; 4] = [
        "debate:join_room",
        "debate:leave_room",
        "debate:self_mute_change",
        "debate:mute_change",
    ];

    /// Decode a stamped inbound body.
    pub fn from_body(body: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(body)
    }
}

/// One entry of `debate:participants_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPayload {
    pub id: String,
    pub user_id: String,
    pub debate_id: String,
    pub role: ParticipantRole,
    /// Empty string until a side is picked
    pub side: String,
    pub is_self_muted: bool,
    pub is_muted_by_host: bool,
    pub joined_at: DateTime<Utc>,
    pub display_name: String,
    pub handle: String,
    pub avatar: String,
}

/// Debate as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebatePayload {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub host_id: String,
    #[serde(rename = "type")]
    pub debate_type: DebateType,
    pub status: DebateStatus,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub show_in_pulse: bool,
    pub agree_count: u32,
    pub disagree_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Envelopes emitted by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    #[serde(rename = "user-joined")]
    UserJoined {
        user_id: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        side: Option<Side>,
    },

    #[serde(rename = "user-left")]
    UserLeft { user_id: String },

    #[serde(rename = "debate:participants_updated")]
    ParticipantsUpdated {
        participants: Vec<ParticipantPayload>,
    },

    #[serde(rename = "debate:status_changed")]
    StatusChanged {
        debate_id: String,
        status: DebateStatus,
        old_status: DebateStatus,
    },

    #[serde(rename = "debate:created")]
    DebateCreated { debate: DebatePayload },
}

impl ServerMessage {
    pub fn user_joined(user_id: &UserId) -> Self {
        Self::UserJoined {
            user_id: user_id.to_string(),
            side: None,
        }
    }

    pub fn user_left(user_id: &UserId) -> Self {
        Self::UserLeft {
            user_id: user_id.to_string(),
        }
    }

    /// Encode to the wire text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
