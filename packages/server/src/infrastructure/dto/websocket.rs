//! WebSocket event DTOs.
//!
//! Every frame is a JSON text frame of the form `{"event": "<name>", "data": {...}}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    LeaveRoom,
    SendMessage(SendMessagePayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomPayload {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "roomID")]
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessagePayload {
    pub text: String,
    #[serde(rename = "roomID")]
    pub room_id: String,
    #[serde(rename = "userName", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Events sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent once to a new connection
    Connected(ConnectedPayload),
    /// A message broadcast to a room
    ReceiveMessage(MessageDto),
    /// Connection id -> participant, for everyone in a room
    ParticipantsStatus(BTreeMap<String, ParticipantDto>),
    /// A rejected or malformed client event
    Error(ErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPayload {
    #[serde(rename = "connectionId")]
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub author: String,
    pub socket_id: Option<String>,
    pub text: String,
    pub room: String,
    /// Unix timestamp (UTC, milliseconds)
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    #[serde(rename = "userName")]
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }
}
