//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 接続時のグリッド送信とレジストリへの登録
//!
//! ### なぜこのテストが必要か
//! - 新しいセッションが最初に受け取るフレームは必ず init でなければならない
//! - init の内容は登録時点のグリッドと一致しなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のグリッド・配置済みのグリッドでの接続
//! - 異常系：送信チャンネルが既に閉じている
//! - 異常系：init フレームの生成に失敗

use std::{fmt::Display, sync::Arc};

use pixelwall_shared::time::Clock;

use crate::{
    domain::{ConnectionRegistry, Grid, PusherChannel, Session, SessionId, Timestamp},
    infrastructure::GridStore,
};

use super::error::ConnectError;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// GridStore（グリッドの唯一の所有者）
    grid_store: Arc<GridStore>,
    /// ConnectionRegistry（セッション管理の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(
        grid_store: Arc<GridStore>,
        registry: Arc<dyn ConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            grid_store,
            registry,
            clock,
        }
    }

    /// セッション接続を実行
    ///
    /// グリッドを読み取りロックしたまま init フレームを生成して登録するため、
    /// init に含まれない配置は必ず登録後にブロードキャストされる。
    ///
    /// # Arguments
    ///
    /// * `sender` - セッションへのメッセージ送信用チャンネル
    /// * `render_init` - グリッドから init フレーム（JSON）を生成する関数
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - 登録済み（Active）のセッション
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute<F, E>(
        &self,
        sender: PusherChannel,
        render_init: F,
    ) -> Result<Session, ConnectError>
    where
        F: FnOnce(&Grid) -> Result<String, E>,
        E: Display,
    {
        let mut session = Session::new(
            SessionId::generate(),
            Timestamp::new(self.clock.now_millis()),
        );

        let grid = self.grid_store.read().await;
        let greeting = render_init(&grid).map_err(|e| ConnectError::InitFrame(e.to_string()))?;
        self.registry
            .register(session.clone(), sender, greeting)
            .await?;
        drop(grid);

        session.activate();
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PersistStrategy,
        domain::{Color, GridSize, SessionState},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryGridRepository,
        },
    };
    use pixelwall_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn render(grid: &Grid) -> Result<String, String> {
        Ok(format!("init:{}", grid.len()))
    }

    async fn create_usecase() -> (
        ConnectSessionUseCase,
        Arc<GridStore>,
        Arc<WebSocketMessagePusher>,
    ) {
        let repo = Arc::new(InMemoryGridRepository::new());
        let grid_store = Arc::new(
            GridStore::open(repo, GridSize::new(100).unwrap(), PersistStrategy::Upsert).await,
        );
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectSessionUseCase::new(
            grid_store.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(1_000)),
        );
        (usecase, grid_store, pusher)
    }

    #[tokio::test]
    async fn test_connect_sends_init_first() {
        // テスト項目: 接続したセッションが最初に init フレームを受け取り、登録される
        // given (前提条件):
        let (usecase, _grid_store, pusher) = create_usecase().await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        let session = usecase.execute(tx, render).await.unwrap();

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some("init:0".to_string()));
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.connected_at, Timestamp::new(1_000));
        assert_eq!(pusher.count().await, 1);
    }

    #[tokio::test]
    async fn test_connect_sees_current_grid() {
        // テスト項目: init フレームは接続時点のグリッドから生成される
        // given (前提条件):
        let (usecase, grid_store, _pusher) = create_usecase().await;
        grid_store
            .apply_pixel(5, 5, Color::new("#ff0000"))
            .await
            .unwrap();
        grid_store
            .apply_pixel(6, 5, Color::new("#00ff00"))
            .await
            .unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        usecase.execute(tx, render).await.unwrap();

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some("init:2".to_string()));
    }

    #[tokio::test]
    async fn test_connect_with_closed_channel_fails() {
        // テスト項目: 受信側が既に閉じている場合は登録されずエラーになる
        // given (前提条件):
        let (usecase, _grid_store, pusher) = create_usecase().await;
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        // when (操作):
        let result = usecase.execute(tx, render).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ConnectError::Registration(_))));
        assert_eq!(pusher.count().await, 0);
    }

    #[tokio::test]
    async fn test_connect_render_failure() {
        // テスト項目: init フレームの生成に失敗した場合は登録されない
        // given (前提条件):
        let (usecase, _grid_store, pusher) = create_usecase().await;
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase
            .execute(tx, |_grid: &Grid| Err::<String, _>("boom"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::InitFrame("boom".to_string())));
        assert_eq!(pusher.count().await, 0);
    }
}
