//! Connection membership per room.
//!
//! Rooms exist only while they have members: the first join creates one, the
//! last leave (or disconnect) drops it. A connection may sit in any number of
//! rooms at once. All state sits behind a single [`Mutex`], so the membership
//! change and the notifications it triggers are observed in the same order by
//! every member.

use core::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use std::collections::{HashMap, HashSet};

use thiserror::Error as ThisError;
use tokio::sync::{
    Mutex,
    mpsc::{self, error::TrySendError},
};
use tracing::{debug, info, warn};

use crate::rooms::events::{Membership, ServerEvent};

/// Identifies one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Events a connection may have queued before it is considered stalled.
pub const OUTBOX_CAPACITY: usize = 256;

/// Outbound queue of a connection.
///
/// Broadcasting never waits on a peer: a connection whose queue is full is
/// cut off (its outbox is dropped, which ends its writer task and with it the
/// connection).
pub type Outbox = mpsc::Sender<ServerEvent>;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum RoomError {
    #[error("missing roomId")]
    MissingRoomId,
}

#[derive(Default)]
struct Rooms {
    members: HashMap<String, HashSet<ConnectionId>>,
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl Rooms {
    fn count(&self, room_id: &str) -> usize {
        self.members.get(room_id).map_or(0, HashSet::len)
    }

    fn membership(&self, room_id: &str) -> Membership {
        Membership {
            room_id: room_id.to_owned(),
            members: self.count(room_id),
        }
    }

    fn send(&mut self, conn: ConnectionId, event: ServerEvent) {
        let Some(outbox) = self.outboxes.get(&conn) else {
            return;
        };
        match outbox.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(%conn, capacity = OUTBOX_CAPACITY, "Outbox full, cutting off stalled connection");
                self.outboxes.remove(&conn);
            }
            // receiver gone: the connection is being torn down
            Err(TrySendError::Closed(_)) => debug!(%conn, "Dropping event for closing connection"),
        }
    }

    fn broadcast(
        &mut self,
        room_id: &str,
        event: &ServerEvent,
        except: Option<ConnectionId>,
    ) -> usize {
        let recipients: Vec<ConnectionId> = self
            .members
            .get(room_id)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&conn| Some(conn) != except)
            .collect();
        for &conn in &recipients {
            self.send(conn, event.clone());
        }
        recipients.len()
    }

    fn remove(&mut self, conn: ConnectionId, room_id: &str) {
        if let Some(members) = self.members.get_mut(room_id) {
            members.remove(&conn);
            if members.is_empty() {
                self.members.remove(room_id);
            }
        }
    }
}

/// Trims a room id, rejecting empty ones.
fn checked_room_id(room_id: &str) -> Result<&str, RoomError> {
    match room_id.trim() {
        "" => Err(RoomError::MissingRoomId),
        trimmed => Ok(trimmed),
    }
}

/// A fresh, hard to guess room id such as `room-3fa2c1`.
#[must_use]
pub fn generate_room_id() -> String {
    format!("room-{}", hex::encode(rand::random::<[u8; 3]>()))
}

/// Which confirmation the acting connection receives on entering a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Created,
    Joined,
}

/// Tracks which connections belong to which rooms and fans out events to them.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<Rooms>,
    next_id: AtomicU64,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection and returns its id and event queue.
    pub async fn connect(&self) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let conn = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        self.rooms.lock().await.outboxes.insert(conn, tx);
        debug!(%conn, "Connection registered");
        (conn, rx)
    }

    /// Removes a connection from every room it was in.
    ///
    /// Each affected room gets a `room:members` update. Returns the affected
    /// rooms with their new member counts.
    pub async fn disconnect(&self, conn: ConnectionId) -> Vec<Membership> {
        let mut rooms = self.rooms.lock().await;
        rooms.outboxes.remove(&conn);

        let affected: Vec<String> = rooms
            .members
            .iter()
            .filter(|&(_, members)| members.contains(&conn))
            .map(|(room_id, _)| room_id.clone())
            .collect();

        let mut updates = Vec::with_capacity(affected.len());
        for room_id in affected {
            rooms.remove(conn, &room_id);
            let membership = rooms.membership(&room_id);
            rooms.broadcast(&room_id, &ServerEvent::RoomMembers(membership.clone()), None);
            updates.push(membership);
        }
        debug!(%conn, rooms = updates.len(), "Connection removed");
        updates
    }

    async fn enter(&self, conn: ConnectionId, room_id: &str, entry: Entry) -> Membership {
        let mut rooms = self.rooms.lock().await;
        rooms
            .members
            .entry(room_id.to_owned())
            .or_default()
            .insert(conn);

        let membership = rooms.membership(room_id);
        let confirmation = match entry {
            Entry::Created => ServerEvent::RoomCreated(membership.clone()),
            Entry::Joined => ServerEvent::RoomJoined(membership.clone()),
        };
        rooms.send(conn, confirmation);
        rooms.broadcast(room_id, &ServerEvent::RoomMembers(membership.clone()), None);
        info!(%conn, room_id, members = membership.members, ?entry, "Entered room");
        membership
    }

    /// Adds `conn` to `room_id`. Joining twice does not count twice.
    ///
    /// # Errors
    ///
    /// [`RoomError::MissingRoomId`] if the trimmed id is empty.
    pub async fn join(&self, conn: ConnectionId, room_id: &str) -> Result<Membership, RoomError> {
        let room_id = checked_room_id(room_id)?;
        Ok(self.enter(conn, room_id, Entry::Joined).await)
    }

    /// Like [`Self::join`], but generates a room id when none (or a blank one) is given.
    pub async fn create(&self, conn: ConnectionId, room_id: Option<&str>) -> Membership {
        let room_id = room_id
            .and_then(|id| checked_room_id(id).ok())
            .map_or_else(generate_room_id, str::to_owned);
        self.enter(conn, &room_id, Entry::Created).await
    }

    /// Removes `conn` from `room_id`; a no-op if it was not a member.
    ///
    /// # Errors
    ///
    /// [`RoomError::MissingRoomId`] if the trimmed id is empty.
    pub async fn leave(&self, conn: ConnectionId, room_id: &str) -> Result<Membership, RoomError> {
        let room_id = checked_room_id(room_id)?;
        let mut rooms = self.rooms.lock().await;
        rooms.remove(conn, room_id);

        let membership = rooms.membership(room_id);
        rooms.broadcast(room_id, &ServerEvent::RoomMembers(membership.clone()), None);
        rooms.send(conn, ServerEvent::RoomLeft(membership.clone()));
        info!(%conn, room_id, members = membership.members, "Left room");
        Ok(membership)
    }

    /// Queues `event` for a single connection.
    pub async fn send(&self, conn: ConnectionId, event: ServerEvent) {
        self.rooms.lock().await.send(conn, event);
    }

    /// Current number of members of `room_id`, zero for unknown rooms.
    pub async fn member_count(&self, room_id: &str) -> usize {
        self.rooms.lock().await.count(room_id)
    }

    /// Sends `event` to every member of `room_id` except `sender`.
    ///
    /// Returns how many connections the event was queued for.
    pub(super) async fn broadcast_except(
        &self,
        room_id: &str,
        event: &ServerEvent,
        sender: ConnectionId,
    ) -> usize {
        self.rooms
            .lock()
            .await
            .broadcast(room_id, event, Some(sender))
    }
}
