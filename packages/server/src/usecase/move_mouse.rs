//! UseCase: カーソル位置の中継

use std::sync::Arc;

use crate::domain::{BroadcastRouter, SessionId};

/// カーソル移動のユースケース
///
/// クールダウンも永続化もなく、送信者以外へそのまま中継する。
pub struct MoveMouseUseCase {
    router: Arc<dyn BroadcastRouter>,
}

impl MoveMouseUseCase {
    pub fn new(router: Arc<dyn BroadcastRouter>) -> Self {
        Self { router }
    }

    /// `mouse_move` フレームを送信者以外へ送る。届いたセッション数を返す。
    pub async fn execute(&self, sender: &SessionId, json_message: &str) -> usize {
        self.router.broadcast_except(sender, json_message).await
    }
}
