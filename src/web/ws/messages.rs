//! WebSocket message types for chat communication.
//!
//! Outbound frames are [`ServerEvent`](crate::chat::ServerEvent) serialized
//! as JSON. Inbound frames decode into [`ClientMessage`], which is lenient
//! about missing fields so that the hub can treat them as malformed input.

use serde::Deserialize;

use crate::chat::{ChatEvent, Scope, TypingSignal};

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Set display name and avatar.
    #[serde(alias = "set_username")]
    Identify {
        #[serde(default, alias = "username")]
        name: Option<String>,
        #[serde(default)]
        avatar: Option<String>,
    },
    /// Send a message, to a room if `room` is set.
    Message {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
    /// Send a private message by display name.
    PrivateMessage {
        #[serde(default, alias = "toUsername")]
        target: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    /// Join a room.
    JoinRoom {
        #[serde(default)]
        room: Option<String>,
    },
    /// Leave a room.
    LeaveRoom {
        #[serde(default)]
        room: Option<String>,
    },
    /// Started typing.
    Typing {
        #[serde(default)]
        room: Option<String>,
    },
    /// Stopped typing.
    StopTyping {
        #[serde(default)]
        room: Option<String>,
    },
    /// Heartbeat ping.
    Ping,
}

impl ClientMessage {
    /// Decode a text frame.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl From<ClientMessage> for ChatEvent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Identify { name, avatar } => ChatEvent::Identify {
                name: name.unwrap_or_default(),
                avatar,
            },
            ClientMessage::Message { text, room } => ChatEvent::Message {
                text: text.unwrap_or_default(),
                scope: Scope::from_room(room.as_deref()),
            },
            ClientMessage::PrivateMessage { target, text } => ChatEvent::PrivateMessage {
                target: target.unwrap_or_default(),
                text: text.unwrap_or_default(),
            },
            ClientMessage::JoinRoom { room } => ChatEvent::JoinRoom {
                room: room.unwrap_or_default(),
            },
            ClientMessage::LeaveRoom { room } => ChatEvent::LeaveRoom {
                room: room.unwrap_or_default(),
            },
            ClientMessage::Typing { room } => ChatEvent::Typing {
                signal: TypingSignal::Started,
                scope: Scope::from_room(room.as_deref()),
            },
            ClientMessage::StopTyping { room } => ChatEvent::Typing {
                signal: TypingSignal::Stopped,
                scope: Scope::from_room(room.as_deref()),
            },
            ClientMessage::Ping => ChatEvent::Ping,
        }
    }
}
