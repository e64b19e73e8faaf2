//! Domain error types.

use thiserror::Error;

/// Canvas validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("coordinate ({x}, {y}) is outside the {size}x{size} canvas")]
    OutOfBounds { x: i64, y: i64, size: u32 },
}

/// Persistence errors
///
/// Never fatal: the in-memory grid stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read grid: {0}")]
    ReadFailed(String),

    #[error("failed to write grid: {0}")]
    WriteFailed(String),
}

/// Errors while delivering a frame to a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("session '{0}' is not registered")]
    SessionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
