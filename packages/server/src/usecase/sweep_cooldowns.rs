//! UseCase: 期限切れクールダウンの掃除

use std::sync::Arc;

use pixelwall_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::CooldownTracker;

pub struct SweepCooldownsUseCase {
    cooldowns: Arc<Mutex<CooldownTracker>>,
    clock: Arc<dyn Clock>,
    retention_ms: i64,
}

impl SweepCooldownsUseCase {
    pub fn new(
        cooldowns: Arc<Mutex<CooldownTracker>>,
        clock: Arc<dyn Clock>,
        retention_ms: u64,
    ) -> Self {
        Self {
            cooldowns,
            clock,
            retention_ms: i64::try_from(retention_ms).unwrap_or(i64::MAX),
        }
    }

    /// 保持期間を過ぎたエントリを削除し、削除数を返す
    pub async fn execute(&self) -> usize {
        let now = self.clock.now_millis();
        let mut cooldowns = self.cooldowns.lock().await;
        let evicted = cooldowns.sweep(now, self.retention_ms);
        if evicted > 0 {
            tracing::debug!(
                "Evicted {} idle cooldown entries ({} remaining)",
                evicted,
                cooldowns.len()
            );
        }
        evicted
    }
}
