//! Room registry for the relay server.
//!
//! Maintains the in-memory collection of sharing rooms and the membership
//! relation. Rooms are ephemeral — lost on relay restart — and a room with
//! zero members is removed the moment it empties. The registry is owned
//! exclusively by the [`crate::controller::RelayController`] and assumes
//! single-threaded mutation; the controller's event loop provides that.

/// Identifier the transport assigns to each client connection.
pub type ConnectionId = u64;

/// An in-flight multi-chunk broadcast buffered for one room.
///
/// Created on `TransferStart`, appended to on `TransferData`, consumed and
/// discarded when `TransferEnd` triggers the broadcast.
#[derive(Debug)]
pub struct TransferSession {
    /// Connection that started the transfer. Excluded from the broadcast.
    pub originator: ConnectionId,
    /// Buffered chunk payloads, in arrival order. Append-only.
    pub chunks: Vec<String>,
}

impl TransferSession {
    /// Creates an empty session originated by the given connection.
    #[must_use]
    pub const fn new(originator: ConnectionId) -> Self {
        Self {
            originator,
            chunks: Vec::new(),
        }
    }
}

/// A named group of connections sharing broadcast scope.
#[derive(Debug)]
pub struct Room {
    /// Room name, a case-sensitive key. No normalization is applied.
    pub name: String,
    /// Member connections, in join order. Never contains duplicates.
    pub members: Vec<ConnectionId>,
    /// The in-flight transfer, present only between a start and its end.
    pub active_transfer: Option<TransferSession>,
}

/// In-memory collection of rooms keyed by name.
///
/// Membership lookup is a linear scan over rooms and members, which is fine
/// at the target scale. Every operation is total: nothing here errors.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { rooms: Vec::new() }
    }

    /// Adds a connection to the named room, creating the room if absent.
    ///
    /// Joining is idempotent: a duplicate join of the same room is silently
    /// ignored. A connection belongs to at most one room at a time, so
    /// joining a different room first removes it from its current one
    /// (cleaning up the old room if it empties).
    pub fn join_room(&mut self, id: ConnectionId, name: &str) {
        if self
            .find_room_by_member(id)
            .is_some_and(|room| room.name != name)
        {
            self.remove_member(id);
        }
        if let Some(room) = self.rooms.iter_mut().find(|room| room.name == name) {
            if !room.members.contains(&id) {
                room.members.push(id);
            }
            return;
        }
        self.rooms.push(Room {
            name: name.to_string(),
            members: vec![id],
            active_transfer: None,
        });
    }

    /// Returns the room the connection belongs to, if any.
    #[must_use]
    pub fn find_room_by_member(&self, id: ConnectionId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.members.contains(&id))
    }

    /// Mutable variant of [`Self::find_room_by_member`].
    pub fn find_room_by_member_mut(&mut self, id: ConnectionId) -> Option<&mut Room> {
        self.rooms
            .iter_mut()
            .find(|room| room.members.contains(&id))
    }

    /// Removes a connection from its room, deleting the room if it empties.
    ///
    /// No-op when the connection is not in any room.
    pub fn remove_member(&mut self, id: ConnectionId) {
        if let Some(pos) = self
            .rooms
            .iter()
            .position(|room| room.members.contains(&id))
        {
            let room = &mut self.rooms[pos];
            room.members.retain(|member| *member != id);
            if room.members.is_empty() {
                self.rooms.remove(pos);
            }
        }
    }

    /// Returns the number of rooms currently registered.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns whether a room with the given name exists.
    #[must_use]
    pub fn contains_room(&self, name: &str) -> bool {
        self.rooms.iter().any(|room| room.name == name)
    }
}
