//! Connection registry and broadcast ports.
//!
//! Sessions are registered with an outbound channel. The WebSocket layer
//! drains that channel into the socket, so pushing a frame never waits on a
//! slow client.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, Session, SessionId};

/// Outbound channel of one session (JSON text frames)
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Tracks the active sessions
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Register a session
    ///
    /// `greeting` is queued on `sender` before the session becomes visible to
    /// broadcasts, so it is always the first frame the session receives.
    async fn register(
        &self,
        session: Session,
        sender: PusherChannel,
        greeting: String,
    ) -> Result<(), MessagePushError>;

    /// Remove a session. Unknown or already removed sessions are a no-op.
    async fn unregister(&self, session_id: &SessionId) -> Option<Session>;

    /// Point-in-time snapshot in registration order
    async fn active_sessions(&self) -> Vec<Session>;

    /// Send one frame to one session
    async fn push_to(&self, session_id: &SessionId, content: &str)
    -> Result<(), MessagePushError>;
}

/// Fans frames out to the active sessions
///
/// Sends to sessions that went away in the meantime are swallowed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastRouter: Send + Sync {
    /// Send to every active session; returns how many sessions accepted it
    async fn broadcast_all(&self, content: &str) -> usize;

    /// Send to every active session except `sender`
    async fn broadcast_except(&self, sender: &SessionId, content: &str) -> usize;
}
