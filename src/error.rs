//! Error types for the chat relay.
//!
//! The chat core itself is infallible: malformed input, lookup misses and
//! late events are handled in-band. These errors cover process-level
//! failures such as loading configuration or binding the listener.

use thiserror::Error;

/// Common error type for the chat relay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid listen address.
    #[error("invalid address: {0}")]
    Address(String),
}

/// Result type alias for chat relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
