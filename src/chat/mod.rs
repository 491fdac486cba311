//! Chat module.
//!
//! This module provides the in-memory chat core:
//! - Session registry (one session per live connection)
//! - Room directory (implicitly created and destroyed rooms)
//! - Presence broadcasting (join/leave notices and the roster)
//! - Typing indicator relay
//! - The hub that routes every inbound event to its recipients

mod event;
mod hub;
mod presence;
mod room;
mod session;
pub mod typing;

pub use event::{now_millis, ChatEvent, PrivateMessage, Scope, ServerEvent};
pub use hub::ChatHub;
pub use presence::{PresenceBroadcaster, Roster, RosterEntry};
pub use room::{normalize_room_name, RoomDirectory};
pub use session::{ConnectionId, Outbox, Session, SessionRegistry, ANONYMOUS, OUTBOX_CAPACITY};
pub use typing::TypingSignal;
