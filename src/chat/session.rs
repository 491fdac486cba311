//! Session registry.
//!
//! One [`Session`] per live connection, keyed by [`ConnectionId`]. The
//! registry keeps sessions in connection order, which is the iteration
//! order used by [`SessionRegistry::find_by_name`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::event::ServerEvent;

/// Name used for sessions that have not identified.
pub const ANONYMOUS: &str = "Anonymous";

/// Number of events a connection may have queued before new ones are dropped.
pub const OUTBOX_CAPACITY: usize = 256;

/// Sending half of a connection's outbound queue.
pub type Outbox = mpsc::Sender<ServerEvent>;

/// Opaque identifier of one connection, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side record of one live connection.
#[derive(Debug)]
pub struct Session {
    id: ConnectionId,
    name: Option<String>,
    avatar: Option<String>,
    rooms: BTreeSet<String>,
    connected_at: DateTime<Utc>,
    outbox: Outbox,
}

impl Session {
    fn new(id: ConnectionId, outbox: Outbox) -> Self {
        Self {
            id,
            name: None,
            avatar: None,
            rooms: BTreeSet::new(),
            connected_at: Utc::now(),
            outbox,
        }
    }

    /// Connection this session belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Display name, `None` until identified.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Display name, or [`ANONYMOUS`] if unidentified.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS)
    }

    /// Custom avatar, `None` for the client's placeholder.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    /// Whether the session has set a display name.
    pub fn is_identified(&self) -> bool {
        self.name.is_some()
    }

    /// Rooms this session has joined.
    pub fn rooms(&self) -> &BTreeSet<String> {
        &self.rooms
    }

    /// When the connection was registered.
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queue an event for this connection without waiting.
    ///
    /// Returns false if the event was dropped, either because the
    /// connection's receiver is gone or because its outbox is full.
    pub fn send(&self, event: ServerEvent) -> bool {
        match self.outbox.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(connection = %self.id, "Outbox full, dropping event");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub(crate) fn add_room(&mut self, room: &str) -> bool {
        self.rooms.insert(room.to_string())
    }

    pub(crate) fn remove_room(&mut self, room: &str) -> bool {
        self.rooms.remove(room)
    }
}

/// Registry of live sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: IndexMap<ConnectionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection with no name, no avatar and no rooms.
    ///
    /// Connecting an ID that is already registered replaces its session.
    pub fn connect(&mut self, id: ConnectionId, outbox: Outbox) -> &Session {
        self.sessions.insert(id, Session::new(id, outbox));
        &self.sessions[&id]
    }

    /// Set the display name and avatar of a session.
    ///
    /// A blank name becomes [`ANONYMOUS`]; a blank avatar becomes `None`.
    /// Returns the name that was stored, or `None` if the connection is unknown.
    pub fn identify(&mut self, id: ConnectionId, name: &str, avatar: Option<&str>) -> Option<&str> {
        let session = self.sessions.get_mut(&id)?;
        let name = match name.trim() {
            "" => ANONYMOUS,
            name => name,
        };
        session.name = Some(name.to_string());
        session.avatar = avatar
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        session.name.as_deref()
    }

    /// Remove a session, returning it if it existed.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Session> {
        self.sessions.shift_remove(&id)
    }

    pub fn lookup(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub(crate) fn lookup_mut(&mut self, id: ConnectionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// First session, in connection order, whose display name equals `name`.
    ///
    /// Display names are not unique; later sessions with the same name are
    /// unreachable by name while an earlier one is connected.
    pub fn find_by_name(&self, name: &str) -> Option<ConnectionId> {
        self.sessions
            .values()
            .find(|s| s.name() == Some(name))
            .map(Session::id)
    }

    /// Display name of a connection, [`ANONYMOUS`] if unidentified or unknown.
    pub fn display_name(&self, id: ConnectionId) -> String {
        self.lookup(id)
            .map(Session::display_name)
            .unwrap_or(ANONYMOUS)
            .to_string()
    }

    /// Queue an event for one connection. Unknown connections are ignored.
    pub fn send_to(&self, id: ConnectionId, event: ServerEvent) -> bool {
        self.lookup(id).is_some_and(|s| s.send(event))
    }

    /// Queue an event for every connection.
    ///
    /// Returns the number of connections the event was queued for.
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        self.sessions
            .values()
            .filter(|s| s.send(event.clone()))
            .count()
    }

    /// Queue an event for every connection except `except`.
    pub fn broadcast_except(&self, except: ConnectionId, event: &ServerEvent) -> usize {
        self.sessions
            .values()
            .filter(|s| s.id != except)
            .filter(|s| s.send(event.clone()))
            .count()
    }

    /// Sessions in connection order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions that have a display name.
    pub fn identified_count(&self) -> usize {
        self.iter().filter(|s| s.is_identified()).count()
    }
}
