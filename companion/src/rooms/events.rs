//! Wire format of the room/sync WebSocket.
//!
//! Frames are JSON objects of the shape `{"type": ..., "payload": ..., "id": ...}`,
//! `id` being optional and echoed back in the matching [`Ack`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Room id plus its member count after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub room_id: String,
    pub members: usize,
}

/// Result of a room operation, sent back to the connection that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    #[must_use]
    pub fn success(id: Option<u64>, membership: Membership) -> Self {
        Self {
            id,
            ok: true,
            room_id: Some(membership.room_id),
            members: Some(membership.members),
            error: None,
        }
    }

    #[must_use]
    pub const fn failure(id: Option<u64>, error: String) -> Self {
        Self {
            id,
            ok: false,
            room_id: None,
            members: None,
            error: Some(error),
        }
    }
}

/// Events pushed from the service to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEvent {
    /// Confirms a `room:create` to its sender.
    #[serde(rename = "room:created")]
    RoomCreated(Membership),
    /// Confirms a `room:join` to its sender.
    #[serde(rename = "room:joined")]
    RoomJoined(Membership),
    /// Confirms a `room:leave` to its sender.
    #[serde(rename = "room:left")]
    RoomLeft(Membership),
    /// Sent to every member whenever the member count of a room changes.
    #[serde(rename = "room:members")]
    RoomMembers(Membership),
    /// A timer snapshot relayed verbatim from another member.
    #[serde(rename = "timer:state")]
    TimerState(Value),
    /// A penalty notification relayed verbatim from another member.
    #[serde(rename = "timer:penalty")]
    TimerPenalty(Value),
    #[serde(rename = "ack")]
    Ack(Ack),
}

/// Payload of the room events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Events sent by a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientEvent {
    #[serde(rename = "room:create")]
    RoomCreate(RoomRequest),
    #[serde(rename = "room:join")]
    RoomJoin(RoomRequest),
    #[serde(rename = "room:leave")]
    RoomLeave(RoomRequest),
    #[serde(rename = "timer:sync")]
    TimerSync(Value),
    #[serde(rename = "timer:penalty")]
    TimerPenalty(Value),
}

/// A decoded client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFrame {
    pub id: Option<u64>,
    pub event: ClientEvent,
}

impl ClientFrame {
    /// Decodes a text frame. A missing or `null` payload is read as `{}`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON, unknown event types or payloads of the wrong shape.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let mut frame: Value = serde_json::from_str(text)?;
        let id = frame.get("id").and_then(Value::as_u64);
        if let Some(fields) = frame.as_object_mut()
            && fields.get("payload").is_none_or(Value::is_null)
        {
            fields.insert("payload".to_owned(), Value::Object(Map::new()));
        }
        let event = serde_json::from_value(frame)?;
        Ok(Self { id, event })
    }
}
