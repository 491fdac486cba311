//! Chat hub: the event router.
//!
//! The hub owns the session registry and the room directory behind a single
//! lock. Every inbound event is handled inside that critical section,
//! including the fan-out onto per-connection outboxes, so membership and
//! roster changes are never observed half-applied and every recipient sees
//! events in the order the hub processed them.

use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use tokio::sync::Mutex;

use super::event::{now_millis, ChatEvent, PrivateMessage, Scope, ServerEvent};
use super::presence::{PresenceBroadcaster, Roster};
use super::room::{normalize_room_name, RoomDirectory};
use super::session::{ConnectionId, Outbox, Session, SessionRegistry};
use super::typing;

#[derive(Debug, Default)]
struct HubState {
    sessions: SessionRegistry,
    rooms: RoomDirectory,
}

impl HubState {
    fn presence(&self) -> PresenceBroadcaster<'_> {
        PresenceBroadcaster::new(&self.sessions)
    }

    fn remove_session(&mut self, id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        self.rooms.leave_all(session.rooms(), id);
        Some(session)
    }

    fn send_to_room(&self, room: &str, event: &ServerEvent) -> usize {
        self.rooms
            .members(room)
            .filter(|id| self.sessions.send_to(*id, event.clone()))
            .count()
    }
}

/// Central router for all connections.
///
/// Shared across connection tasks behind an `Arc`.
#[derive(Debug, Default)]
pub struct ChatHub {
    state: Mutex<HubState>,
}

impl ChatHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and the outbox its events are queued on.
    pub async fn connect(&self, id: ConnectionId, outbox: Outbox) {
        let mut state = self.state.lock().await;
        state.sessions.connect(id, outbox);
        tracing::info!(connection = %id, total = state.sessions.len(), "User connected");
    }

    /// Remove a connection and all of its room memberships.
    ///
    /// Announces `user_left` if the session was identified, then the roster.
    /// Unknown connections are ignored.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut state = self.state.lock().await;
        let Some(session) = state.remove_session(id) else {
            tracing::debug!(connection = %id, "Disconnect for unknown connection");
            return;
        };
        let connected_secs = (Utc::now() - session.connected_at()).num_seconds();
        tracing::info!(
            connection = %id,
            name = session.display_name(),
            connected_secs,
            "User disconnected"
        );

        let presence = state.presence();
        if let Some(name) = session.name() {
            presence.notify_left(name);
        }
        presence.broadcast_roster();
    }

    /// Route one inbound event from a connection.
    ///
    /// Events from connections that are no longer registered are dropped.
    pub async fn dispatch(&self, id: ConnectionId, event: ChatEvent) {
        let mut state = self.state.lock().await;
        if !state.sessions.contains(id) {
            tracing::debug!(connection = %id, kind = event.kind(), "Ignoring late event");
            return;
        }

        match event {
            ChatEvent::Identify { name, avatar } => {
                Self::identify_locked(&mut state, id, &name, avatar.as_deref())
            }
            ChatEvent::Message { text, scope } => Self::message_locked(&state, id, &text, &scope),
            ChatEvent::PrivateMessage { target, text } => {
                Self::private_message_locked(&state, id, &target, &text)
            }
            ChatEvent::JoinRoom { room } => Self::join_room_locked(&mut state, id, &room),
            ChatEvent::LeaveRoom { room } => Self::leave_room_locked(&mut state, id, &room),
            ChatEvent::Typing { signal, scope } => {
                typing::relay(&state.sessions, &state.rooms, id, signal, &scope);
            }
            ChatEvent::Ping => {
                state.sessions.send_to(id, ServerEvent::Pong);
            }
        }
    }

    /// Set a connection's display name and avatar.
    pub async fn identify(&self, id: ConnectionId, name: &str, avatar: Option<&str>) {
        let mut state = self.state.lock().await;
        Self::identify_locked(&mut state, id, name, avatar);
    }

    /// Send a public message, to a room if `room` is non-blank, else globally.
    pub async fn send_message(&self, id: ConnectionId, text: &str, room: Option<&str>) {
        let state = self.state.lock().await;
        if state.sessions.contains(id) {
            Self::message_locked(&state, id, text, &Scope::from_room(room));
        }
    }

    /// Send a private message to the first user named `target`.
    pub async fn send_private(&self, id: ConnectionId, target: &str, text: &str) {
        let state = self.state.lock().await;
        if state.sessions.contains(id) {
            Self::private_message_locked(&state, id, target, text);
        }
    }

    /// Join a room. Blank room names are ignored.
    pub async fn join_room(&self, id: ConnectionId, room: &str) {
        let mut state = self.state.lock().await;
        Self::join_room_locked(&mut state, id, room);
    }

    /// Leave a room. Ignored if the connection is not a member.
    pub async fn leave_room(&self, id: ConnectionId, room: &str) {
        let mut state = self.state.lock().await;
        Self::leave_room_locked(&mut state, id, room);
    }

    /// Current roster of identified users.
    pub async fn roster(&self) -> Roster {
        self.state.lock().await.presence().roster()
    }

    /// Members of a room, empty if the room does not exist.
    pub async fn members_of(&self, room: &str) -> HashSet<ConnectionId> {
        self.state.lock().await.rooms.members_of(room)
    }

    /// Rooms a connection has joined, `None` if the connection is unknown.
    pub async fn rooms_of(&self, id: ConnectionId) -> Option<BTreeSet<String>> {
        self.state
            .lock()
            .await
            .sessions
            .lookup(id)
            .map(|s| s.rooms().clone())
    }

    /// Display name of a connection, `None` if unknown or unidentified.
    pub async fn name_of(&self, id: ConnectionId) -> Option<String> {
        self.state
            .lock()
            .await
            .sessions
            .lookup(id)
            .and_then(|s| s.name().map(str::to_string))
    }

    /// Connection currently reachable by `name`.
    pub async fn find_by_name(&self, name: &str) -> Option<ConnectionId> {
        self.state.lock().await.sessions.find_by_name(name)
    }

    /// Names of all live rooms, sorted.
    pub async fn room_names(&self) -> Vec<String> {
        self.state.lock().await.rooms.room_names()
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.state.lock().await.rooms.room_count()
    }

    /// Number of live connections, identified or not.
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Whether every room membership is mirrored on its session and vice versa.
    pub async fn is_consistent(&self) -> bool {
        let state = self.state.lock().await;
        let forward = state.rooms.memberships().all(|(room, id)| {
            state
                .sessions
                .lookup(id)
                .is_some_and(|s| s.rooms().contains(room))
        });
        let backward = state
            .sessions
            .iter()
            .all(|s| s.rooms().iter().all(|room| state.rooms.is_member(room, s.id())));
        forward && backward
    }

    fn identify_locked(state: &mut HubState, id: ConnectionId, name: &str, avatar: Option<&str>) {
        let Some(name) = state.sessions.identify(id, name, avatar).map(str::to_string) else {
            return;
        };
        tracing::info!(connection = %id, name = %name, "Username set");

        let presence = state.presence();
        presence.notify_joined(&name);
        presence.broadcast_roster();
    }

    fn message_locked(state: &HubState, id: ConnectionId, text: &str, scope: &Scope) {
        if text.trim().is_empty() {
            tracing::debug!(connection = %id, "Dropping blank message");
            return;
        }

        let sender = state.sessions.display_name(id);
        let timestamp = now_millis();
        match scope {
            Scope::Room(room) => {
                let event = ServerEvent::RoomMessage {
                    sender: sender.clone(),
                    text: text.to_string(),
                    timestamp,
                    room: room.clone(),
                };
                let delivered = state.send_to_room(room, &event);
                tracing::debug!(sender = %sender, room = %room, delivered, "Room message");
            }
            Scope::Global => {
                let event = ServerEvent::Message {
                    sender: sender.clone(),
                    text: text.to_string(),
                    timestamp,
                };
                let delivered = state.sessions.broadcast(&event);
                tracing::debug!(sender = %sender, delivered, "Global message");
            }
        }
    }

    fn private_message_locked(state: &HubState, id: ConnectionId, target: &str, text: &str) {
        if text.trim().is_empty() {
            tracing::debug!(connection = %id, "Dropping blank private message");
            return;
        }

        let target = target.trim();
        let Some(recipient) = state.sessions.find_by_name(target) else {
            state.sessions.send_to(
                id,
                ServerEvent::UserNotFound {
                    target: target.to_string(),
                },
            );
            return;
        };

        let payload = PrivateMessage {
            from: state.sessions.display_name(id),
            to: target.to_string(),
            text: text.to_string(),
            timestamp: now_millis(),
        };
        tracing::debug!(from = %payload.from, to = %payload.to, "Private message");
        state
            .sessions
            .send_to(recipient, ServerEvent::PrivateMessage(payload.clone()));
        state
            .sessions
            .send_to(id, ServerEvent::PrivateMessageSent(payload));
    }

    fn join_room_locked(state: &mut HubState, id: ConnectionId, room: &str) {
        let Some(room) = normalize_room_name(room) else {
            return;
        };
        let Some(session) = state.sessions.lookup_mut(id) else {
            return;
        };
        session.add_room(room);
        state.rooms.join(room, id);

        let name = state.sessions.display_name(id);
        tracing::info!(connection = %id, name = %name, room = %room, "Joined room");
        state.send_to_room(
            room,
            &ServerEvent::SystemMessage {
                text: format!("{name} joined {room}"),
            },
        );
        state.presence().broadcast_roster();
    }

    fn leave_room_locked(state: &mut HubState, id: ConnectionId, room: &str) {
        let Some(room) = normalize_room_name(room) else {
            return;
        };
        let Some(session) = state.sessions.lookup_mut(id) else {
            return;
        };
        if !session.remove_room(room) {
            return;
        }
        state.rooms.leave(room, id);

        let name = state.sessions.display_name(id);
        tracing::info!(connection = %id, name = %name, room = %room, "Left room");
        state.send_to_room(
            room,
            &ServerEvent::SystemMessage {
                text: format!("{name} left {room}"),
            },
        );
        state.presence().broadcast_roster();
    }
}
