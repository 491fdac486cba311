//! Room directory.
//!
//! Maps room names to member connection IDs. Rooms exist only while they
//! have members: the first join creates a room and the last leave removes it.
//! The member → rooms side of the cross-reference lives on each
//! [`Session`](super::Session); the hub updates both sides together.

use std::collections::{HashMap, HashSet};

use super::session::ConnectionId;

/// Normalize a room name, rejecting blank names.
pub fn normalize_room_name(room: &str) -> Option<&str> {
    let room = room.trim();
    (!room.is_empty()).then_some(room)
}

/// Directory of rooms and their members.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member to a room, creating the room if needed.
    ///
    /// Returns true if the member was added, false if already present.
    pub fn join(&mut self, room: &str, id: ConnectionId) -> bool {
        self.rooms.entry(room.to_string()).or_default().insert(id)
    }

    /// Remove a member from a room, removing the room when it becomes empty.
    ///
    /// Returns true if the member was present.
    pub fn leave(&mut self, room: &str, id: ConnectionId) -> bool {
        let Some(members) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(&id);
        if members.is_empty() {
            self.rooms.remove(room);
        }
        removed
    }

    /// Remove a member from each of the given rooms.
    pub fn leave_all<'a>(&mut self, rooms: impl IntoIterator<Item = &'a String>, id: ConnectionId) {
        for room in rooms {
            self.leave(room, id);
        }
    }

    /// Snapshot of a room's members. Empty if the room does not exist.
    pub fn members_of(&self, room: &str) -> HashSet<ConnectionId> {
        self.rooms.get(room).cloned().unwrap_or_default()
    }

    /// Iterate a room's members without copying.
    pub fn members(&self, room: &str) -> impl Iterator<Item = ConnectionId> + '_ {
        self.rooms.get(room).into_iter().flatten().copied()
    }

    /// Whether `id` is a member of `room`.
    pub fn is_member(&self, room: &str, id: ConnectionId) -> bool {
        self.rooms.get(room).is_some_and(|m| m.contains(&id))
    }

    /// Whether `room` currently has at least one member.
    pub fn contains_room(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    /// Names of all live rooms, sorted.
    pub fn room_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rooms.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Every (room, member) pair, for consistency checks.
    pub fn memberships(&self) -> impl Iterator<Item = (&str, ConnectionId)> + '_ {
        self.rooms
            .iter()
            .flat_map(|(room, members)| members.iter().map(move |id| (room.as_str(), *id)))
    }
}
