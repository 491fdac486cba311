//! Presence broadcasting.
//!
//! The roster is never stored; it is derived from the session registry
//! each time it is needed.

use serde::Serialize;

use super::event::ServerEvent;
use super::session::SessionRegistry;

/// One identified user in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub name: String,
    pub avatar: Option<String>,
}

/// Snapshot of identified users.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Roster {
    pub users: Vec<RosterEntry>,
    pub count: usize,
}

impl Roster {
    /// Build the roster from every identified session, in connection order.
    pub fn from_registry(sessions: &SessionRegistry) -> Self {
        let users: Vec<RosterEntry> = sessions
            .iter()
            .filter_map(|s| {
                s.name().map(|name| RosterEntry {
                    name: name.to_string(),
                    avatar: s.avatar().map(str::to_string),
                })
            })
            .collect();
        let count = users.len();
        Self { users, count }
    }

    /// Roster display names.
    pub fn names(&self) -> Vec<&str> {
        self.users.iter().map(|u| u.name.as_str()).collect()
    }

    /// Convert into the `user_list` event.
    pub fn into_event(self) -> ServerEvent {
        ServerEvent::UserList {
            users: self.users,
            count: self.count,
        }
    }
}

/// Emits presence events to every connection.
pub struct PresenceBroadcaster<'a> {
    sessions: &'a SessionRegistry,
}

impl<'a> PresenceBroadcaster<'a> {
    pub fn new(sessions: &'a SessionRegistry) -> Self {
        Self { sessions }
    }

    /// Current roster of identified sessions.
    pub fn roster(&self) -> Roster {
        Roster::from_registry(self.sessions)
    }

    /// Send the current roster to every connection, identified or not.
    pub fn broadcast_roster(&self) -> usize {
        let roster = self.roster();
        tracing::trace!(count = roster.count, "Broadcasting roster");
        self.sessions.broadcast(&roster.into_event())
    }

    /// Announce to every connection that `name` identified.
    pub fn notify_joined(&self, name: &str) -> usize {
        self.sessions.broadcast(&ServerEvent::UserJoined {
            name: name.to_string(),
        })
    }

    /// Announce to every connection that `name` disconnected.
    pub fn notify_left(&self, name: &str) -> usize {
        self.sessions.broadcast(&ServerEvent::UserLeft {
            name: name.to_string(),
        })
    }
}
