//! Error types for the canvas client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Input line that is not a known command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}
