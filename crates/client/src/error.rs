//! Error types for the driver.

use protocol::ErrorCode;
use thiserror::Error;

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the engine.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to establish a session with the engine
    #[error("connection error: {0}")]
    Connection(#[source] std::io::Error),

    /// Wire-level error (framing, serialization, broken socket)
    #[error("protocol error: {0}")]
    Protocol(#[source] std::io::Error),

    /// The engine rejected a statement
    #[error("engine error ({code}): {message}")]
    Engine { code: ErrorCode, message: String },
}

impl ClientError {
    /// Returns true if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }

    /// Returns true if this is a protocol error.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, ClientError::Protocol(_))
    }

    /// Returns true if the engine itself rejected the statement.
    pub fn is_engine_error(&self) -> bool {
        matches!(self, ClientError::Engine { .. })
    }

    /// Returns the engine's error code, when one was reported.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }
}
