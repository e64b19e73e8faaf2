//! UseCase: ピクセル配置処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PlacePixelUseCase::execute() メソッド
//! - クールダウン判定 → グリッド更新 → 永続化 → 全セッションへのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - クールダウン中の配置はグリッドを変えず、ブロードキャストもしない
//! - 範囲外の座標は拒否されるが、クールダウンは消費される
//! - 永続化に失敗してもメモリ上の変更とブロードキャストは行われる
//!
//! ### どのような状況を想定しているか
//! - 正常系：間隔を空けた連続配置（最後の色が残る）
//! - 異常系：クールダウン中の配置、範囲外の座標、保存失敗
//! - エッジケース：ちょうど期限の時刻での配置、同時配置の順序

use std::sync::Arc;

use pixelwall_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{BroadcastRouter, Color, Coordinate, CooldownDecision, CooldownTracker, UserId},
    infrastructure::GridStore,
};

use super::error::PlacePixelError;

/// Result of an accepted placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub coordinate: Coordinate,
    /// The user's next placement is allowed from this time on
    pub cooldown_until: i64,
    pub persisted: bool,
    /// Number of sessions the `update_pixel` frame reached
    pub delivered: usize,
}

/// ピクセル配置のユースケース
pub struct PlacePixelUseCase {
    grid_store: Arc<GridStore>,
    /// SweepCooldownsUseCase と共有する
    cooldowns: Arc<Mutex<CooldownTracker>>,
    router: Arc<dyn BroadcastRouter>,
    clock: Arc<dyn Clock>,
    cooldown_ms: i64,
    /// 配置処理全体を一列に並べる
    sequencer: Mutex<()>,
}

impl PlacePixelUseCase {
    pub fn new(
        grid_store: Arc<GridStore>,
        cooldowns: Arc<Mutex<CooldownTracker>>,
        router: Arc<dyn BroadcastRouter>,
        clock: Arc<dyn Clock>,
        cooldown_ms: u64,
    ) -> Self {
        Self {
            grid_store,
            cooldowns,
            router,
            clock,
            cooldown_ms: i64::try_from(cooldown_ms).unwrap_or(i64::MAX),
            sequencer: Mutex::new(()),
        }
    }

    /// ピクセル配置を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - 配置したユーザー（クライアント申告値）
    /// * `x`, `y` - 配置する座標
    /// * `color` - 色（検証しない）
    /// * `json_message` - 成功時に全セッションへ送る update_pixel フレーム（DTO 層で生成されたもの）
    ///
    /// # Returns
    ///
    /// * `Ok(PlacementOutcome)` - 配置成功
    /// * `Err(PlacePixelError)` - クールダウン中、または範囲外
    pub async fn execute(
        &self,
        user_id: UserId,
        x: i64,
        y: i64,
        color: Color,
        json_message: String,
    ) -> Result<PlacementOutcome, PlacePixelError> {
        let _turn = self.sequencer.lock().await;

        // 1. クールダウン判定
        let now = self.clock.now_millis();
        let decision =
            self.cooldowns
                .lock()
                .await
                .check_and_record(&user_id, now, self.cooldown_ms);
        let cooldown_until = match decision {
            CooldownDecision::Allowed { expires_at } => expires_at,
            CooldownDecision::Denied { retry_at } => {
                tracing::debug!(
                    "User '{}' is on cooldown for another {} ms",
                    user_id,
                    retry_at - now
                );
                return Err(PlacePixelError::CooldownActive { retry_at });
            }
        };

        // 2. グリッド更新と永続化
        let applied = self.grid_store.apply_pixel(x, y, color).await?;

        // 3. 送信者を含む全セッションへブロードキャスト
        let delivered = self.router.broadcast_all(&json_message).await;
        tracing::debug!(
            "User '{}' placed pixel {} ({} sessions notified)",
            user_id,
            applied.coordinate,
            delivered
        );

        Ok(PlacementOutcome {
            coordinate: applied.coordinate,
            cooldown_until,
            persisted: applied.persisted,
            delivered,
        })
    }
}
