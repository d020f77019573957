//! Ephemeral rooms of connected timer clients.

pub mod events;
mod registry;
mod sync;

pub use registry::{
    ConnectionId, OUTBOX_CAPACITY, Outbox, RoomError, RoomRegistry, generate_room_id,
};
pub use sync::SyncKind;
