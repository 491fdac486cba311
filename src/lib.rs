//! chatrelay - real-time chat relay
//!
//! Clients connect over WebSocket, pick a display name and avatar, and chat
//! globally, in rooms, or privately while seeing who is online and typing.
//! All state is in memory and lives only as long as the connections do.

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod web;

pub use chat::{ChatEvent, ChatHub, ConnectionId, ServerEvent};
pub use config::Config;
pub use error::{RelayError, Result};
pub use web::WebServer;
