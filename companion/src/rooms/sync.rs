//! Relaying of timer snapshots and penalties between room members.
//!
//! Payloads are opaque: only `roomId` is looked at, the rest is forwarded as is.

use serde_json::Value;
use tracing::debug;

use crate::rooms::{
    events::ServerEvent,
    registry::{ConnectionId, RoomRegistry},
};

/// The two kinds of session events that are relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// `timer:sync` in, `timer:state` out.
    TimerState,
    /// `timer:penalty` in and out.
    Penalty,
}

impl SyncKind {
    fn into_event(self, payload: Value) -> ServerEvent {
        match self {
            Self::TimerState => ServerEvent::TimerState(payload),
            Self::Penalty => ServerEvent::TimerPenalty(payload),
        }
    }
}

/// Target room of a sync payload, if it names a non-blank one.
fn target_room(payload: &Value) -> Option<&str> {
    payload
        .get("roomId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|room_id| !room_id.is_empty())
}

impl RoomRegistry {
    /// Forwards `payload` to every member of its `roomId` except `sender`.
    ///
    /// Payloads without a usable `roomId` are dropped silently. Returns the
    /// number of connections the payload was queued for.
    pub async fn relay(&self, sender: ConnectionId, kind: SyncKind, payload: Value) -> usize {
        let Some(room_id) = target_room(&payload).map(str::to_owned) else {
            debug!(%sender, ?kind, "Dropping sync event without roomId");
            return 0;
        };
        let delivered = self
            .broadcast_except(&room_id, &kind.into_event(payload), sender)
            .await;
        debug!(%sender, ?kind, %room_id, delivered, "Relayed sync event");
        delivered
    }
}
