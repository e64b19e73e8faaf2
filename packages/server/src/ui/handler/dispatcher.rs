//! Inbound frame dispatch.
//!
//! Turns one text frame from a session into a use case call. Bad input is
//! reported as a [`ProtocolError`] and never closes the session.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::{
    domain::{Color, ConnectionRegistry, SessionId, UserId},
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
    usecase::{MoveMouseUseCase, PlacePixelError, PlacePixelUseCase, PlacementOutcome},
};

/// Frames the server could not make sense of
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("invalid '{kind}' message: {reason}")]
    InvalidShape { kind: String, reason: String },
}

/// What happened to a well-formed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Placed(PlacementOutcome),
    /// Placement refused; the sender got an `error` frame
    Rejected(PlacePixelError),
    /// `mouse_move` relayed to this many sessions
    Relayed(usize),
    /// Client `init`; carries the announced user id, if any
    Handshake(Option<String>),
    /// Unknown `type`
    Ignored,
}

/// Routes parsed frames to the use cases
pub struct MessageDispatcher {
    place_pixel_usecase: Arc<PlacePixelUseCase>,
    move_mouse_usecase: Arc<MoveMouseUseCase>,
    /// 送信者だけに返す error フレーム用
    registry: Arc<dyn ConnectionRegistry>,
}

impl MessageDispatcher {
    pub fn new(
        place_pixel_usecase: Arc<PlacePixelUseCase>,
        move_mouse_usecase: Arc<MoveMouseUseCase>,
        registry: Arc<dyn ConnectionRegistry>,
    ) -> Self {
        Self {
            place_pixel_usecase,
            move_mouse_usecase,
            registry,
        }
    }

    /// Parse a text frame
    ///
    /// Invalid JSON and recognised types with the wrong fields are errors;
    /// an unrecognised `type` parses to [`ClientMessage::Unknown`].
    pub fn parse(text: &str) -> Result<ClientMessage, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_string();
        serde_json::from_value(value).map_err(|e| ProtocolError::InvalidShape {
            kind,
            reason: e.to_string(),
        })
    }

    /// Handle one text frame from `session_id`
    pub async fn dispatch(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<DispatchOutcome, ProtocolError> {
        match Self::parse(text)? {
            ClientMessage::PlacePixel {
                x,
                y,
                color,
                user_id,
            } => {
                let update = encode(
                    "place_pixel",
                    &ServerMessage::UpdatePixel {
                        x,
                        y,
                        color: color.clone(),
                    },
                )?;
                match self
                    .place_pixel_usecase
                    .execute(UserId::new(user_id), x, y, Color::new(color), update)
                    .await
                {
                    Ok(outcome) => Ok(DispatchOutcome::Placed(outcome)),
                    Err(e) => {
                        tracing::debug!("Placement from session '{}' refused: {}", session_id, e);
                        self.reply_error(session_id, e.client_message()).await;
                        Ok(DispatchOutcome::Rejected(e))
                    }
                }
            }
            ClientMessage::MoveMouse { user_id, x, y } => {
                let cursor = encode("move_mouse", &ServerMessage::MouseMove { user_id, x, y })?;
                let relayed = self.move_mouse_usecase.execute(session_id, &cursor).await;
                Ok(DispatchOutcome::Relayed(relayed))
            }
            ClientMessage::Init { user_id } => {
                tracing::debug!(
                    "Session '{}' announced user '{}'",
                    session_id,
                    user_id.as_deref().unwrap_or("-")
                );
                Ok(DispatchOutcome::Handshake(user_id))
            }
            ClientMessage::Unknown => {
                tracing::debug!("Ignoring frame of unknown type from '{}'", session_id);
                Ok(DispatchOutcome::Ignored)
            }
        }
    }

    /// Send an `error` frame to the sender only; delivery failures are logged
    async fn reply_error(&self, session_id: &SessionId, message: &str) {
        let frame = match ServerMessage::error(message).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to build error frame for '{}': {}", session_id, e);
                return;
            }
        };
        if let Err(e) = self.registry.push_to(session_id, &frame).await {
            tracing::warn!("Failed to send error to session '{}': {}", session_id, e);
        }
    }
}

/// Build the outgoing frame from the fields of an inbound `kind` message
fn encode(kind: &str, message: &ServerMessage) -> Result<String, ProtocolError> {
    message.to_json().map_err(|e| ProtocolError::InvalidShape {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}
