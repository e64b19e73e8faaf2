//! UseCase layer errors.

use thiserror::Error;

use crate::domain::{GridError, MessagePushError};

/// Reasons a placement is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacePixelError {
    #[error("cooldown active until {retry_at}")]
    CooldownActive { retry_at: i64 },

    #[error(transparent)]
    OutOfBounds(#[from] GridError),
}

impl PlacePixelError {
    /// Text of the `error` frame sent back to the placing session
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::CooldownActive { .. } => "Cooldown actief!",
            Self::OutOfBounds(_) => "Ongeldige coördinaten!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("failed to render init frame: {0}")]
    InitFrame(String),

    #[error(transparent)]
    Registration(#[from] MessagePushError),
}
