//! WebSocket を使った ConnectionRegistry / BroadcastRouter 実装
//!
//! ## 責務
//!
//! - 接続中のセッションと、その送信チャンネル（`UnboundedSender`）を管理
//! - セッションへのメッセージ送信（push_to, broadcast_all, broadcast_except）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//!
//! セッションは登録順に保持されるため、ブロードキャストは接続の古い順に配送されます。
//! 送信はノンブロッキング（unbounded channel）なので、ブロードキャスト中はロックを
//! 保持したまま配送し、その時点のスナップショットに対して送信します。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastRouter, ConnectionRegistry, MessagePushError, PusherChannel, Session, SessionId,
};

struct SessionEntry {
    session: Session,
    sender: PusherChannel,
}

/// WebSocket を使った ConnectionRegistry / BroadcastRouter 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
///
/// pusher.register(session, tx, init_json).await?;
/// pusher.broadcast_all("{\"type\":\"update_pixel\",\"x\":5,\"y\":5,\"color\":\"#ff0000\"}").await;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のセッション（登録順）
    sessions: Mutex<Vec<SessionEntry>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続中のセッション数
    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn fan_out(&self, exclude: Option<&SessionId>, content: &str) -> usize {
        let sessions = self.sessions.lock().await;
        let mut delivered = 0;

        for entry in sessions
            .iter()
            .filter(|entry| Some(&entry.session.id) != exclude)
        {
            // ブロードキャストでは切断途中のセッションへの送信失敗を許容
            if let Err(e) = entry.sender.send(content.to_string()) {
                tracing::warn!(
                    "Failed to push message to session '{}': {}",
                    entry.session.id,
                    e
                );
            } else {
                delivered += 1;
            }
        }

        tracing::debug!("Broadcasted message to {} sessions", delivered);
        delivered
    }
}

#[async_trait]
impl ConnectionRegistry for WebSocketMessagePusher {
    async fn register(
        &self,
        mut session: Session,
        sender: PusherChannel,
        greeting: String,
    ) -> Result<(), MessagePushError> {
        let mut sessions = self.sessions.lock().await;

        // 最初のフレームを先に積んでから公開する
        sender
            .send(greeting)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        session.activate();

        tracing::debug!("Session '{}' registered to MessagePusher", session.id);
        match sessions
            .iter_mut()
            .find(|entry| entry.session.id == session.id)
        {
            Some(entry) => *entry = SessionEntry { session, sender },
            None => sessions.push(SessionEntry { session, sender }),
        }
        Ok(())
    }

    async fn unregister(&self, session_id: &SessionId) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        let index = sessions
            .iter()
            .position(|entry| &entry.session.id == session_id)?;
        let mut session = sessions.remove(index).session;
        session.close();
        tracing::debug!("Session '{}' unregistered from MessagePusher", session_id);
        Some(session)
    }

    async fn active_sessions(&self) -> Vec<Session> {
        let sessions = self.sessions.lock().await;
        sessions.iter().map(|entry| entry.session.clone()).collect()
    }

    async fn push_to(
        &self,
        session_id: &SessionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let sessions = self.sessions.lock().await;

        let entry = sessions
            .iter()
            .find(|entry| &entry.session.id == session_id)
            .ok_or_else(|| MessagePushError::SessionNotFound(session_id.to_string()))?;
        entry
            .sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to session '{}'", session_id);
        Ok(())
    }
}

#[async_trait]
impl BroadcastRouter for WebSocketMessagePusher {
    async fn broadcast_all(&self, content: &str) -> usize {
        self.fan_out(None, content).await
    }

    async fn broadcast_except(&self, sender: &SessionId, content: &str) -> usize {
        self.fan_out(Some(sender), content).await
    }
}
