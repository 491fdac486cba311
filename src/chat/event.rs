//! Chat events flowing into and out of the hub.

use serde::Serialize;

use super::presence::RosterEntry;
use super::typing::TypingSignal;

/// Routing target for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every connection.
    Global,
    /// Members of a single room.
    Room(String),
}

impl Scope {
    /// Build a scope from an optional room name.
    ///
    /// A missing or blank room name means global.
    pub fn from_room(room: Option<&str>) -> Self {
        match room.map(str::trim) {
            Some(room) if !room.is_empty() => Scope::Room(room.to_string()),
            _ => Scope::Global,
        }
    }

    /// The room name, if room-scoped.
    pub fn room(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Room(room) => Some(room),
        }
    }
}

/// An inbound event from one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Set display name and avatar.
    Identify {
        name: String,
        avatar: Option<String>,
    },
    /// Public message, global or to a room.
    Message { text: String, scope: Scope },
    /// Direct message to a user by display name.
    PrivateMessage { target: String, text: String },
    /// Join a room.
    JoinRoom { room: String },
    /// Leave a room.
    LeaveRoom { room: String },
    /// Typing started or stopped.
    Typing { signal: TypingSignal, scope: Scope },
    /// Heartbeat.
    Ping,
}

impl ChatEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::Identify { .. } => "identify",
            ChatEvent::Message { .. } => "message",
            ChatEvent::PrivateMessage { .. } => "private_message",
            ChatEvent::JoinRoom { .. } => "join_room",
            ChatEvent::LeaveRoom { .. } => "leave_room",
            ChatEvent::Typing {
                signal: TypingSignal::Started,
                ..
            } => "typing",
            ChatEvent::Typing {
                signal: TypingSignal::Stopped,
                ..
            } => "stop_typing",
            ChatEvent::Ping => "ping",
        }
    }
}

/// Payload shared by `private_message` and `private_message_sent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateMessage {
    pub from: String,
    pub to: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// An outbound event delivered to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Global chat message.
    Message {
        sender: String,
        text: String,
        timestamp: i64,
    },
    /// Room chat message.
    RoomMessage {
        sender: String,
        text: String,
        timestamp: i64,
        room: String,
    },
    /// Room join/leave notice.
    SystemMessage { text: String },
    /// A user identified.
    UserJoined { name: String },
    /// An identified user disconnected.
    UserLeft { name: String },
    /// Incoming private message.
    PrivateMessage(PrivateMessage),
    /// Echo of a delivered private message to its sender.
    PrivateMessageSent(PrivateMessage),
    /// Private message target does not exist.
    UserNotFound { target: String },
    /// Current roster.
    UserList { users: Vec<RosterEntry>, count: usize },
    /// Someone is typing.
    Typing {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    /// Someone stopped typing.
    StopTyping {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    /// Heartbeat reply.
    Pong,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
