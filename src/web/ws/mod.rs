//! WebSocket module for real-time chat.
//!
//! Each connection gets one task that decodes inbound frames into chat
//! events and writes queued outbound events back to the socket.

pub mod chat;
pub mod messages;

pub use chat::chat_ws_handler;
pub use messages::ClientMessage;
