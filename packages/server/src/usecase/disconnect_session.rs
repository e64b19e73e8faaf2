//! UseCase: セッション切断処理

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, SessionId};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectSessionUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// セッションをレジストリから外す
    ///
    /// 何度呼んでもよい。実際に外した場合のみ `true` を返す。
    pub async fn execute(&self, session_id: &SessionId) -> bool {
        match self.registry.unregister(session_id).await {
            Some(session) => {
                tracing::info!("Session '{}' closed ({:?})", session.id, session.state);
                true
            }
            None => {
                tracing::debug!("Session '{}' was already removed", session_id);
                false
            }
        }
    }
}
