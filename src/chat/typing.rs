//! Typing indicator relay.
//!
//! Clients refresh `typing` or send `stop_typing` within about 800ms; that
//! debounce lives on the client. The server only forwards the signal to
//! the right recipients and keeps no typing state.

use super::event::{Scope, ServerEvent};
use super::room::RoomDirectory;
use super::session::{ConnectionId, SessionRegistry};

/// Whether a user started or stopped typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    Started,
    Stopped,
}

impl TypingSignal {
    /// Outbound event announcing this signal.
    pub fn event(self, name: impl Into<String>, scope: &Scope) -> ServerEvent {
        let name = name.into();
        let room = scope.room().map(str::to_string);
        match self {
            TypingSignal::Started => ServerEvent::Typing { name, room },
            TypingSignal::Stopped => ServerEvent::StopTyping { name, room },
        }
    }
}

/// Forward a typing signal from `sender`.
///
/// Room-scoped signals go to the other members of that room; global signals
/// go to every other connection. Returns the number of recipients.
pub fn relay(
    sessions: &SessionRegistry,
    rooms: &RoomDirectory,
    sender: ConnectionId,
    signal: TypingSignal,
    scope: &Scope,
) -> usize {
    let event = signal.event(sessions.display_name(sender), scope);
    match scope {
        Scope::Global => sessions.broadcast_except(sender, &event),
        Scope::Room(room) => rooms
            .members(room)
            .filter(|id| *id != sender)
            .filter(|id| sessions.send_to(*id, event.clone()))
            .count(),
    }
}
